//! Pass scheduling.

use tess_ir::{CompileError, Node};

use crate::{Context, FactKind};

/// Default bound on fixed-point iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 16;

/// One compiler stage over a whole term.
pub trait Pass {
    fn name(&self) -> &'static str;

    /// Fact kinds that must be in the context before [`run`](Self::run).
    fn requires(&self) -> Vec<FactKind> {
        Vec::new()
    }

    /// Fact kinds the pass guarantees are in the context after it runs.
    fn produces(&self) -> Vec<FactKind> {
        Vec::new()
    }

    fn run(&mut self, root: &Node, ctx: &mut Context) -> Result<Node, CompileError>;
}

/// Ordered list of passes with dependency checks and fixed-point mode.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
    max_iterations: usize,
}

impl PassManager {
    pub fn new() -> Self {
        PassManager {
            passes: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Append a pass (builder style).
    #[must_use]
    pub fn with(mut self, pass: impl Pass + 'static) -> Self {
        self.push(Box::new(pass));
        self
    }

    pub fn push(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|pass| pass.name())
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run the pass list over `root`.
    ///
    /// With `fixed_point`, the whole list is repeated until an iteration
    /// leaves the root unchanged. Exceeding the iteration bound is a
    /// [`NonConvergence`] error carrying the last root.
    ///
    /// [`NonConvergence`]: CompileError::NonConvergence
    #[tracing::instrument(level = "debug", skip_all, fields(passes = self.passes.len(), fixed_point = fixed_point))]
    pub fn run(&mut self, root: &Node, ctx: &mut Context, fixed_point: bool) -> Result<Node, CompileError> {
        if !fixed_point {
            return self.run_once(root, ctx);
        }

        let mut current = root.clone();
        for iteration in 1..=self.max_iterations {
            let next = self.run_once(&current, ctx)?;
            if next == current {
                tracing::debug!(iterations = iteration, "fixed point reached");
                return Ok(next);
            }
            tracing::trace!(iteration, root = %next, "iteration changed the root");
            current = next;
        }
        Err(CompileError::NonConvergence {
            iterations: self.max_iterations,
            last: current,
        })
    }

    fn run_once(&mut self, root: &Node, ctx: &mut Context) -> Result<Node, CompileError> {
        let mut current = root.clone();
        for pass in &mut self.passes {
            let name = pass.name();
            if let Some(missing) = pass.requires().into_iter().find(|kind| !ctx.contains(*kind)) {
                return Err(CompileError::MissingDependency {
                    pass: name,
                    fact: missing.name(),
                });
            }

            current = pass.run(&current, ctx)?;

            if let Some(absent) = pass.produces().into_iter().find(|kind| !ctx.contains(*kind)) {
                return Err(CompileError::internal(
                    format!("pass `{name}` did not produce its declared fact `{absent}`"),
                    [current],
                ));
            }
            tracing::trace!(pass = name, "pass complete");
        }
        Ok(current)
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
