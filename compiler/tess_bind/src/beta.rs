//! Beta reduction for value and type application.
//!
//! `Apply(Lambda, arg)` and `ApplyT(PiT, arg)` reduce by the same rule.
//! A de Bruijn binder reduces by index substitution:
//!
//! ```text
//! (λ. body) arg  ⟶  shift(subst(body, 0, shift(arg, 1, 0), 0), -1, 0)
//! ```
//!
//! A HOAS binder (a Pi type still being assembled by a builder) reduces by
//! replacing its placeholder; HOAS binders do not count toward indices, so
//! no shifting is needed around it.

use rustc_hash::FxHashMap;
use tess_ir::construct::apply_t;
use tess_ir::{ensure_sufficient_stack, Children, Kind, Node, NodeAddr};

use crate::{shift, subst, subst_binder};

/// Reduce the redex at the root of `node`, if any.
///
/// Anything other than `Apply(Lambda, _)` or `ApplyT(PiT, _)` is returned
/// unchanged: applying a symbolic function is a normal residual term.
pub fn beta_reduce(node: &Node) -> Node {
    let is_redex = matches!(
        (node.kind(), node.children().first().map(Node::kind)),
        (Kind::Apply, Some(Kind::Lambda)) | (Kind::ApplyT, Some(Kind::PiT))
    );
    if !is_redex {
        return node.clone();
    }
    let function = node.child(0);
    let (body, arg) = (function.child(1), node.child(1));

    let reduced = match function.binder() {
        Some(binder) => subst_binder(body, binder, arg, 0),
        None => {
            let lifted = shift(arg, 1, 0);
            shift(&subst(body, 0, &lifted, 0), -1, 0)
        }
    };
    tracing::trace!(%node, %reduced, "beta");
    reduced
}

/// Result type of applying a function of type `pi` to `arg`.
///
/// Reduces when `pi` is a Pi type; otherwise the application stays as a
/// residual `ApplyT`.
pub fn apply_type(pi: &Node, arg: &Node) -> Node {
    beta_reduce(&apply_t(pi.clone(), arg.clone()))
}

/// `Apply(f, arg)` typed by [`apply_type`].
///
/// # Panics
///
/// Panics if `f` or `arg` is a type.
pub fn apply(f: Node, arg: Node) -> Node {
    let ty = match f.ty() {
        Some(pi) => apply_type(pi, &arg),
        None => panic!("cannot apply the type {f}"),
    };
    Node::new(Kind::Apply, [], [f, arg], Some(ty))
}

/// Reduce every redex in `node`, innermost first, until none remains.
///
/// Subterms without the `HAS_REDEX` flag are shared untouched.
pub fn beta_normalize(node: &Node) -> Node {
    Normalizer::default().normalize(node)
}

#[derive(Default)]
struct Normalizer {
    /// Keyed by input identity. Inputs include intermediate reducts, so the
    /// entry keeps its input alive to pin the address.
    memo: FxHashMap<NodeAddr, (Node, Node)>,
}

impl Normalizer {
    fn normalize(&mut self, node: &Node) -> Node {
        if !node.flags().has_redex() {
            return node.clone();
        }
        if let Some((_, done)) = self.memo.get(&node.addr()) {
            return done.clone();
        }
        let result = ensure_sufficient_stack(|| {
            let ty = node.ty().map(|t| self.normalize(t));
            let children: Children = node.children().iter().map(|c| self.normalize(c)).collect();
            let rebuilt = node.rebuild_if_changed(children, ty);
            let reduced = beta_reduce(&rebuilt);
            if Node::ptr_eq(&reduced, &rebuilt) {
                rebuilt
            } else {
                // Substitution can expose new redexes.
                self.normalize(&reduced)
            }
        });
        self.memo.insert(node.addr(), (node.clone(), result.clone()));
        result
    }
}
