//! Invariant check for canonical IR.
//!
//! Run after the pipeline in debug builds. Every violation is a compiler
//! bug and raises [`CompileError::InternalConsistency`].

use rustc_hash::FxHashSet;
use tess_bind::first_hoas;
use tess_ir::{ensure_sufficient_stack, CompileError, Node, NodeAddr};

/// Check that `root` is canonical:
///
/// - no HOAS node and no free de Bruijn index;
/// - values carry a type, types do not;
/// - every node has an arity its constructor accepts;
/// - AC operands are flat and sorted by canonical key.
pub fn validate(root: &Node) -> Result<(), CompileError> {
    if let Some(hoas) = first_hoas(root) {
        return Err(CompileError::internal(format!("canonical IR contains HOAS node {hoas}"), [hoas]));
    }
    if !root.is_closed() {
        return Err(CompileError::internal("canonical IR has a free bound variable", [root.clone()]));
    }
    // `root` keeps every node alive, so addresses stay unique.
    let mut seen = FxHashSet::default();
    check(root, &mut seen)
}

fn check(node: &Node, seen: &mut FxHashSet<NodeAddr>) -> Result<(), CompileError> {
    if !seen.insert(node.addr()) {
        return Ok(());
    }
    let kind = node.kind();
    if kind.is_type() != node.ty().is_none() {
        return Err(CompileError::internal(
            format!("`{kind}` node has the wrong type presence"),
            [node.clone()],
        ));
    }
    if !kind.arity().accepts(node.children().len()) {
        return Err(CompileError::internal(
            format!("`{kind}` expects {} children, found {}", kind.arity(), node.children().len()),
            [node.clone()],
        ));
    }
    if kind.is_ac() {
        if let Some(nested) = node.children().iter().find(|c| c.kind() == kind) {
            return Err(CompileError::internal(
                format!("`{kind}` operand is not flattened"),
                [node.clone(), nested.clone()],
            ));
        }
        if !node.children().windows(2).all(|pair| pair[0].key() <= pair[1].key()) {
            return Err(CompileError::internal(
                format!("`{kind}` operands are not sorted"),
                [node.clone()],
            ));
        }
    }
    ensure_sufficient_stack(|| {
        for next in node.ty().into_iter().chain(node.children()) {
            check(next, seen)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests;
