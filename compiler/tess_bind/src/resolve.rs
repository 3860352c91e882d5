//! HOAS → de Bruijn resolution.
//!
//! A single top-down traversal carrying the stack of open binders. HOAS
//! binders push their handle; de Bruijn binders (built directly by
//! construction helpers) push an anonymous frame. On leaving a binder the
//! frame is popped.
//!
//! # Index Remapping
//!
//! - `Placeholder(id)` becomes `BoundVar(p)`, where `p` is the distance
//!   from the top of the stack to the frame holding `id`.
//! - An existing `BoundVar(k)` counts only anonymous frames (HOAS binders
//!   are invisible to indices until resolved). It is renumbered to the
//!   distance to the `k`-th anonymous frame, or, if it escapes every open
//!   frame, re-based past all of them.
//!
//! Every binder is emitted in de Bruijn form (`Binder(None)`), and node
//! types are resolved under the same stack as the node itself.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tess_ir::{ensure_sufficient_stack, BinderId, Children, CompileError, Field, Kind, Node, NodeAddr};

/// Convert a HOAS term to de Bruijn form.
///
/// Fails with [`CompileError::UnboundVariable`] if a placeholder is used
/// outside every open binder for its handle.
#[tracing::instrument(level = "debug", skip_all)]
pub fn resolve_bindings(root: &Node) -> Result<Node, CompileError> {
    let mut resolver = Resolver::default();
    let resolved = resolver.resolve(root)?;
    tracing::debug!(memo_entries = resolver.memo.len(), "bindings resolved");
    Ok(resolved)
}

/// An open binder.
#[derive(Copy, Clone)]
struct Frame {
    /// `None` for a binder already in de Bruijn form.
    binder: Option<BinderId>,
    /// Unique per push; identifies the whole stack below it.
    scope: u32,
}

#[derive(Default)]
struct Resolver {
    stack: SmallVec<[Frame; 16]>,
    next_scope: u32,
    memo: FxHashMap<(NodeAddr, u32), Node>,
}

impl Resolver {
    /// Identity of the current stack state. Two visits with the same
    /// scope see identical stacks, so their results can be shared.
    fn scope(&self) -> u32 {
        self.stack.last().map_or(0, |frame| frame.scope)
    }

    fn push(&mut self, binder: Option<BinderId>) {
        self.next_scope += 1;
        self.stack.push(Frame {
            binder,
            scope: self.next_scope,
        });
    }

    fn resolve(&mut self, node: &Node) -> Result<Node, CompileError> {
        // Closed, fully de Bruijn subterms mean the same under any stack.
        if !node.flags().has_hoas() && node.is_closed() {
            return Ok(node.clone());
        }
        let key = (node.addr(), self.scope());
        if let Some(done) = self.memo.get(&key) {
            return Ok(done.clone());
        }
        let result = ensure_sufficient_stack(|| self.resolve_uncached(node))?;
        self.memo.insert(key, result.clone());
        Ok(result)
    }

    fn resolve_uncached(&mut self, node: &Node) -> Result<Node, CompileError> {
        let ty = node.ty().map(|t| self.resolve(t)).transpose()?;

        match (node.kind(), node.fields()) {
            (Kind::Placeholder, [Field::Binder(Some(id))]) => {
                let index = self.placeholder_index(*id).ok_or_else(|| CompileError::UnboundVariable {
                    binder: *id,
                    node: node.clone(),
                })?;
                Ok(Node::new(Kind::BoundVar, [Field::Index(index)], [], ty))
            }
            (Kind::BoundVar, [Field::Index(k)]) => {
                let index = self.bound_index(*k);
                if index == *k && node.unchanged(&[], ty.as_ref()) {
                    return Ok(node.clone());
                }
                Ok(Node::new(Kind::BoundVar, [Field::Index(index)], [], ty))
            }
            (kind, [Field::Binder(binder)]) if kind.is_binder() => {
                let param = self.resolve(node.child(0))?;
                self.push(*binder);
                let body = self.resolve(node.child(1));
                self.stack.pop();
                let body = body?;
                if binder.is_none() && node.unchanged(&[param.clone(), body.clone()], ty.as_ref()) {
                    return Ok(node.clone());
                }
                Ok(Node::new(kind, [Field::Binder(None)], [param, body], ty))
            }
            _ => {
                let children = node
                    .children()
                    .iter()
                    .map(|child| self.resolve(child))
                    .collect::<Result<Children, _>>()?;
                Ok(node.rebuild_if_changed(children, ty))
            }
        }
    }

    fn placeholder_index(&self, id: BinderId) -> Option<u32> {
        let depth = self.stack.iter().rev().position(|frame| frame.binder == Some(id))?;
        u32::try_from(depth).ok()
    }

    fn bound_index(&self, k: u32) -> u32 {
        let mut anonymous = 0u32;
        for (depth, frame) in self.stack.iter().rev().enumerate() {
            if frame.binder.is_none() {
                if anonymous == k {
                    return to_index(depth);
                }
                anonymous += 1;
            }
        }
        // Escapes every open frame: skip the HOAS frames it was blind to.
        to_index(self.stack.len()) + (k - anonymous)
    }
}

fn to_index(depth: usize) -> u32 {
    u32::try_from(depth).unwrap_or(u32::MAX)
}
