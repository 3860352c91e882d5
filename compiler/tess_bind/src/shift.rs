//! De Bruijn index shifting.

use rustc_hash::FxHashMap;
use tess_ir::{ensure_sufficient_stack, Children, Field, Kind, Node, NodeAddr};

/// Add `d` to every free `BoundVar` index `>= cutoff` in `term`.
///
/// The cutoff grows by one under each de Bruijn binder crossed. Subterms
/// with no free index at or above the cutoff are returned untouched, so a
/// closed term is returned as the identical object.
///
/// # Panics
///
/// Panics if an index would become negative: shifting down past a use of
/// the eliminated binder means the caller substituted incorrectly.
pub fn shift(term: &Node, d: i64, cutoff: u32) -> Node {
    if d == 0 || term.free_depth() <= cutoff {
        return term.clone();
    }
    Shifter {
        d,
        memo: FxHashMap::default(),
    }
    .shift(term, cutoff)
}

struct Shifter {
    d: i64,
    memo: FxHashMap<(NodeAddr, u32), Node>,
}

impl Shifter {
    fn shift(&mut self, node: &Node, cutoff: u32) -> Node {
        if node.free_depth() <= cutoff {
            return node.clone();
        }
        let key = (node.addr(), cutoff);
        if let Some(done) = self.memo.get(&key) {
            return done.clone();
        }
        let result = ensure_sufficient_stack(|| self.shift_uncached(node, cutoff));
        self.memo.insert(key, result.clone());
        result
    }

    fn shift_uncached(&mut self, node: &Node, cutoff: u32) -> Node {
        let ty = node.ty().map(|t| self.shift(t, cutoff));

        if let (Kind::BoundVar, [Field::Index(k)]) = (node.kind(), node.fields()) {
            let index = if *k >= cutoff {
                let shifted = i64::from(*k) + self.d;
                u32::try_from(shifted).unwrap_or_else(|_| {
                    panic!("shifting {node} by {} produces invalid index {shifted}", self.d)
                })
            } else {
                *k
            };
            return Node::new(Kind::BoundVar, [Field::Index(index)], [], ty);
        }

        let children: Children = node
            .children()
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let inner = if node.is_debruijn_scope(i) { cutoff + 1 } else { cutoff };
                self.shift(child, inner)
            })
            .collect();
        node.rebuild_if_changed(children, ty)
    }
}

#[cfg(test)]
mod tests;
