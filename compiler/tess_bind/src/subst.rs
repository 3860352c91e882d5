//! Capture-avoiding substitution.
//!
//! Two flavours share one traversal:
//! - [`subst`] replaces a de Bruijn index (`BoundVar(j + depth)`)
//! - [`subst_binder`] replaces a HOAS placeholder by handle
//!
//! In both, the replacement is shifted up by the number of de Bruijn
//! binders crossed between the substitution root and the use site, so its
//! own free indices keep pointing at the same outer binders.

use rustc_hash::FxHashMap;
use tess_ir::{ensure_sufficient_stack, BinderId, Children, Field, Kind, Node, NodeAddr};

use crate::shift;

/// Replace every `BoundVar(j + depth)` in `term` with `shift(s, depth, 0)`,
/// recursing with `depth + 1` under each de Bruijn binder.
///
/// Indices other than the target are left as they are; callers eliminating
/// a binder shift the result down afterwards (see [`beta_reduce`](crate::beta_reduce)).
pub fn subst(term: &Node, j: u32, s: &Node, depth: u32) -> Node {
    Substituter::new(Target::Index(j), s).subst(term, depth)
}

/// Replace every `Placeholder(binder)` in `term` with `shift(s, depth, 0)`,
/// recursing with `depth + 1` under each de Bruijn binder.
///
/// Terms without HOAS nodes are returned untouched.
pub fn subst_binder(term: &Node, binder: BinderId, s: &Node, depth: u32) -> Node {
    Substituter::new(Target::Binder(binder), s).subst(term, depth)
}

#[derive(Copy, Clone)]
enum Target {
    Index(u32),
    Binder(BinderId),
}

struct Substituter<'s> {
    target: Target,
    replacement: &'s Node,
    /// `replacement` shifted by each depth it was needed at.
    shifted: FxHashMap<u32, Node>,
    memo: FxHashMap<(NodeAddr, u32), Node>,
}

impl<'s> Substituter<'s> {
    fn new(target: Target, replacement: &'s Node) -> Self {
        Substituter {
            target,
            replacement,
            shifted: FxHashMap::default(),
            memo: FxHashMap::default(),
        }
    }

    /// True if `node` cannot contain the target at this depth.
    fn skips(&self, node: &Node, depth: u32) -> bool {
        match self.target {
            Target::Index(j) => node.free_depth() <= j + depth,
            Target::Binder(_) => !node.flags().has_hoas(),
        }
    }

    fn is_target(&self, node: &Node, depth: u32) -> bool {
        match (self.target, node.kind(), node.fields()) {
            (Target::Index(j), Kind::BoundVar, [Field::Index(k)]) => *k == j + depth,
            (Target::Binder(id), Kind::Placeholder, [Field::Binder(Some(b))]) => *b == id,
            _ => false,
        }
    }

    fn replacement_at(&mut self, depth: u32) -> Node {
        let replacement = self.replacement;
        self.shifted
            .entry(depth)
            .or_insert_with(|| shift(replacement, i64::from(depth), 0))
            .clone()
    }

    fn subst(&mut self, node: &Node, depth: u32) -> Node {
        if self.skips(node, depth) {
            return node.clone();
        }
        if self.is_target(node, depth) {
            return self.replacement_at(depth);
        }
        let key = (node.addr(), depth);
        if let Some(done) = self.memo.get(&key) {
            return done.clone();
        }
        let result = ensure_sufficient_stack(|| {
            let ty = node.ty().map(|t| self.subst(t, depth));
            let children: Children = node
                .children()
                .iter()
                .enumerate()
                .map(|(i, child)| {
                    let inner = if node.is_debruijn_scope(i) { depth + 1 } else { depth };
                    self.subst(child, inner)
                })
                .collect();
            node.rebuild_if_changed(children, ty)
        });
        self.memo.insert(key, result.clone());
        result
    }
}
