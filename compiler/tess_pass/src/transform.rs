//! Tree rewrites.
//!
//! A transform rebuilds the tree bottom-up through per-kind handlers.
//! Results are memoized per (node identity, binder frames): the meaning of
//! a `BoundVar` depends on which binders are open, so one node object seen
//! under two different binders must not share a cached rewrite.
//!
//! # Frames
//!
//! Entering a de Bruijn binder pushes a fresh [`FrameId`]. A node with
//! `free_depth() == n` can only refer to the innermost `n` frames, so the
//! memo key holds exactly those. Closed nodes therefore share one entry
//! across every binder they appear under.

use std::any::Any;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tess_ir::{ensure_sufficient_stack, Children, CompileError, Kind, Node, NodeAddr};

use crate::{Context, Dispatch, FactKind, Pass};

/// Handler rewriting one node.
pub type RewriteFn = fn(&mut Rewriter<'_>, &Node) -> Result<Node, CompileError>;

/// Identity of one binder entry during a rewrite.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FrameId(u32);

#[derive(Eq, PartialEq, Hash)]
struct MemoKey {
    addr: NodeAddr,
    frames: SmallVec<[FrameId; 4]>,
}

/// Traversal state of one transform run.
pub struct Rewriter<'a> {
    ctx: &'a Context,
    dispatch: &'a Dispatch<RewriteFn>,
    frames: Vec<FrameId>,
    next_frame: u32,
    /// Entries keep their input alive so addresses stay unique.
    memo: FxHashMap<MemoKey, (Node, Node)>,
}

impl<'a> Rewriter<'a> {
    pub fn new(ctx: &'a Context, dispatch: &'a Dispatch<RewriteFn>) -> Self {
        Rewriter {
            ctx,
            dispatch,
            frames: Vec::new(),
            next_frame: 0,
            memo: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn ctx(&self) -> &'a Context {
        self.ctx
    }

    /// Number of binders currently open.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Frames `node` can refer to: the innermost `free_depth` ones.
    pub fn frames_for(&self, node: &Node) -> &[FrameId] {
        let visible = (node.free_depth() as usize).min(self.frames.len());
        &self.frames[self.frames.len() - visible..]
    }

    /// The rewrite of `node`, computing it on first visit in this scope.
    pub fn visit(&mut self, node: &Node) -> Result<Node, CompileError> {
        let key = MemoKey {
            addr: node.addr(),
            frames: self.frames_for(node).iter().copied().collect(),
        };
        if let Some((_, done)) = self.memo.get(&key) {
            return Ok(done.clone());
        }
        let result = ensure_sufficient_stack(|| match self.dispatch.get(node.kind()) {
            Some(handler) => handler(self, node),
            None => self.rewrite_children(node),
        })?;
        if self.memo.insert(key, (node.clone(), result.clone())).is_some() {
            return Err(CompileError::internal(
                format!("rewrite memo already holds an entry for {node}"),
                [node.clone()],
            ));
        }
        Ok(result)
    }

    /// Default fallback: rewrite the type and children, opening a frame
    /// for the child under a de Bruijn binder, and rebuild only on change.
    pub fn rewrite_children(&mut self, node: &Node) -> Result<Node, CompileError> {
        let ty = node.ty().map(|t| self.visit(t)).transpose()?;
        let mut children = Children::with_capacity(node.children().len());
        for (i, child) in node.children().iter().enumerate() {
            let rewritten = if node.is_debruijn_scope(i) {
                self.in_binder(|rw| rw.visit(child))?
            } else {
                self.visit(child)?
            };
            children.push(rewritten);
        }
        Ok(node.rebuild_if_changed(children, ty))
    }

    /// Run `f` with one more binder open.
    pub fn in_binder<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.next_frame += 1;
        self.frames.push(FrameId(self.next_frame));
        let result = f(self);
        self.frames.pop();
        result
    }
}

/// A dispatch-table transform.
pub struct TransformPass {
    name: &'static str,
    requires: Vec<FactKind>,
    dispatch: Dispatch<RewriteFn>,
}

impl TransformPass {
    pub fn builder(name: &'static str) -> TransformPassBuilder {
        TransformPassBuilder {
            pass: TransformPass {
                name,
                requires: Vec::new(),
                dispatch: Dispatch::new(),
            },
        }
    }

    /// Rewrite `root` with a fresh memo.
    #[tracing::instrument(level = "debug", skip_all, fields(pass = self.name))]
    pub fn rewrite(&self, root: &Node, ctx: &Context) -> Result<Node, CompileError> {
        let mut rewriter = Rewriter::new(ctx, &self.dispatch);
        let result = rewriter.visit(root)?;
        tracing::debug!(
            memo_entries = rewriter.memo.len(),
            changed = !Node::ptr_eq(&result, root),
            "transform complete"
        );
        Ok(result)
    }
}

impl Pass for TransformPass {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires(&self) -> Vec<FactKind> {
        self.requires.clone()
    }

    fn run(&mut self, root: &Node, ctx: &mut Context) -> Result<Node, CompileError> {
        self.rewrite(root, ctx)
    }
}

/// Builder for [`TransformPass`].
pub struct TransformPassBuilder {
    pass: TransformPass,
}

impl TransformPassBuilder {
    #[must_use]
    pub fn requires<T: Any>(mut self) -> Self {
        self.pass.requires.push(FactKind::of::<T>());
        self
    }

    #[must_use]
    pub fn handle(mut self, kind: Kind, handler: RewriteFn) -> Self {
        self.pass.dispatch.register(kind, handler);
        self
    }

    pub fn build(self) -> TransformPass {
        self.pass
    }
}

#[cfg(test)]
mod tests;
