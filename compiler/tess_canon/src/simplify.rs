//! Beta simplification.
//!
//! Rewrites every `Apply(Lambda, _)` and `ApplyT(PiT, _)` redex, including
//! those inside types, and keeps reducing while a reduction exposes a new
//! redex at the same position.

use tess_bind::beta_reduce;
use tess_ir::{CompileError, Kind, Node};
use tess_pass::{Context, Rewriter, TransformPass};

/// The beta-simplification transform.
pub struct BetaSimplify;

impl BetaSimplify {
    pub const NAME: &'static str = "beta-simplify";

    pub fn pass() -> TransformPass {
        TransformPass::builder(Self::NAME)
            .handle(Kind::Apply, reduce)
            .handle(Kind::ApplyT, reduce)
            .build()
    }

    /// Simplify `root` once, outside any pipeline.
    pub fn run(root: &Node) -> Result<Node, CompileError> {
        Self::pass().rewrite(root, &Context::new())
    }
}

fn reduce(rw: &mut Rewriter<'_>, node: &Node) -> Result<Node, CompileError> {
    let node = rw.rewrite_children(node)?;
    let reduced = beta_reduce(&node);
    if Node::ptr_eq(&reduced, &node) {
        return Ok(node);
    }
    rw.visit(&reduced)
}
