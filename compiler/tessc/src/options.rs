//! Pipeline configuration.

use tess_pass::DEFAULT_MAX_ITERATIONS;

/// Stages and bounds of one compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Bound on the simplification fixed point.
    pub max_iterations: usize,
    /// Run the type checker (needs a `TypeEnv` in the context).
    pub check_types: bool,
    /// Run domain attribute inference.
    pub infer_domains: bool,
    /// Check the invariants of the result. On by default in debug builds.
    pub validate: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            check_types: true,
            infer_domains: true,
            validate: cfg!(debug_assertions),
        }
    }
}

impl PipelineOptions {
    /// Defaults overridden by `TESS_MAX_ITERATIONS` and `TESS_VALIDATE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by the variables `lookup` returns.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(raw) = lookup("TESS_MAX_ITERATIONS") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => options.max_iterations = n,
                _ => tracing::warn!(value = %raw, "ignoring invalid TESS_MAX_ITERATIONS"),
            }
        }
        if let Some(raw) = lookup("TESS_VALIDATE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => options.validate = true,
                "0" | "false" | "no" | "off" => options.validate = false,
                _ => tracing::warn!(value = %raw, "ignoring invalid TESS_VALIDATE"),
            }
        }
        options
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_type_check(mut self, enabled: bool) -> Self {
        self.check_types = enabled;
        self
    }

    #[must_use]
    pub fn with_domain_inference(mut self, enabled: bool) -> Self {
        self.infer_domains = enabled;
        self
    }

    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }
}

#[cfg(test)]
mod tests;
