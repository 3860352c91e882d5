//! Type equality.

use tess_canon::normalize;
use tess_ir::{CompileError, Node};

/// True if `a` and `b` denote the same type.
///
/// Types are compared as they stand first; only differing types pay for
/// normalization. Both types must live in the same binder scope.
pub fn types_equal(a: &Node, b: &Node) -> Result<bool, CompileError> {
    if a == b {
        return Ok(true);
    }
    Ok(normalize(a)? == normalize(b)?)
}

#[cfg(test)]
mod tests;
