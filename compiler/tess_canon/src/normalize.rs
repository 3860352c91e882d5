//! Normal form for comparing dependent types.

use tess_bind::beta_normalize;
use tess_ir::{CompileError, Node};
use tess_pass::{Context, DEFAULT_MAX_ITERATIONS};

use crate::ConstFold;

/// Beta-normalize `node`, then alternate constant folding and beta
/// normalization until the term stops changing.
///
/// Two types are equal iff their normal forms are equal. Folding
/// can expose redexes (a `Match` on a literal injection) and reduction can
/// expose foldable literals, hence the loop.
#[tracing::instrument(level = "trace", skip_all)]
pub fn normalize(node: &Node) -> Result<Node, CompileError> {
    let fold = ConstFold::pass();
    let ctx = Context::new();
    let mut current = beta_normalize(node);
    for _ in 0..DEFAULT_MAX_ITERATIONS {
        let next = beta_normalize(&fold.rewrite(&current, &ctx)?);
        if next == current {
            return Ok(next);
        }
        current = next;
    }
    Err(CompileError::NonConvergence {
        iterations: DEFAULT_MAX_ITERATIONS,
        last: current,
    })
}

#[cfg(test)]
mod tests;
