//! Post-resolution invariant check.

use tess_ir::{ensure_sufficient_stack, CompileError, Node};

/// Confirm `root` is fully resolved: no HOAS node anywhere (values, types
/// or binders) and no de Bruijn index escaping the root.
///
/// Either violation is a compiler bug and raises
/// [`CompileError::InternalConsistency`] naming the offending node.
pub fn ensure_resolved(root: &Node) -> Result<(), CompileError> {
    if let Some(hoas) = first_hoas(root) {
        return Err(CompileError::internal(
            format!("HOAS node {hoas} survived binder resolution"),
            [hoas, root.clone()],
        ));
    }
    if !root.is_closed() {
        return Err(CompileError::internal(
            format!("index {} escapes the top-level term", root.free_depth() - 1),
            [root.clone()],
        ));
    }
    Ok(())
}

/// The first HOAS node (placeholder or HOAS binder) in pre-order, if any.
pub fn first_hoas(node: &Node) -> Option<Node> {
    if !node.flags().has_hoas() {
        return None;
    }
    if node.binder().is_some() {
        return Some(node.clone());
    }
    ensure_sufficient_stack(|| node.children().iter().chain(node.ty()).find_map(first_hoas))
}

#[cfg(test)]
mod tests;
