use pretty_assertions::assert_eq;
use tess_ir::construct::{add, bound, int, int_t, lambda};

use super::*;

/// Rewrites every literal `n` to `n + 1`.
fn bump(_: &mut Rewriter<'_>, node: &Node) -> Result<Node, CompileError> {
    Ok(int(node.as_int().unwrap_or_default() + 1))
}

/// Replaces each `BoundVar` by the current binder depth.
fn depth_of(rw: &mut Rewriter<'_>, _: &Node) -> Result<Node, CompileError> {
    Ok(int(i64::try_from(rw.depth()).unwrap_or_default()))
}

#[test]
fn rewrites_through_default_fallback() {
    let pass = TransformPass::builder("bump").handle(Kind::Lit, bump).build();
    let root = add([int(1), add([int(2), int(3)])]);
    let result = pass.rewrite(&root, &Context::new()).unwrap();
    assert_eq!(result.to_string(), "(add 2 (add 3 4))");
}

#[test]
fn unchanged_trees_keep_identity() {
    let pass = TransformPass::builder("noop").build();
    let root = lambda(None, int_t(), add([bound(0, int_t()), int(1)]));
    let result = pass.rewrite(&root, &Context::new()).unwrap();
    assert!(Node::ptr_eq(&result, &root));
}

#[test]
fn bound_nodes_are_not_shared_across_binders() {
    // The same `#0` object appears at depth 1 and at depth 2.
    let x = bound(0, int_t());
    let inner = lambda(None, int_t(), x.clone());
    let outer = lambda(None, int_t(), add([x, inner]));
    let pass = TransformPass::builder("depth").handle(Kind::BoundVar, depth_of).build();
    let result = pass.rewrite(&outer, &Context::new()).unwrap();
    assert_eq!(result.child(1).to_string(), "(add 1 (lambda :_ int 2))");
}

#[test]
fn closed_nodes_share_one_memo_entry() {
    let shared = add([int(5), int(6)]);
    let root = add([shared.clone(), lambda(None, int_t(), shared)]);
    let pass = TransformPass::builder("bump").handle(Kind::Lit, bump).build();
    let result = pass.rewrite(&root, &Context::new()).unwrap();
    assert!(Node::ptr_eq(result.child(0), result.child(1).child(1)));
}

#[test]
fn frames_for_tracks_visible_binders() {
    let ctx = Context::new();
    let dispatch = Dispatch::new();
    let mut rw = Rewriter::new(&ctx, &dispatch);
    let open = bound(1, int_t());
    let closed = int(1);
    rw.in_binder(|rw| {
        rw.in_binder(|rw| {
            assert_eq!(rw.depth(), 2);
            assert_eq!(rw.frames_for(&open).len(), 2);
            assert!(rw.frames_for(&closed).is_empty());
        });
    });
    assert_eq!(rw.depth(), 0);
}
