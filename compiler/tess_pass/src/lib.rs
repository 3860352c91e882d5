//! Tessera pass framework.
//!
//! Every compiler stage after binder resolution is a [`Pass`] composed by a
//! [`PassManager`]:
//!
//! - **Analysis** ([`AnalysisPass`]): read-only, memoized per node identity,
//!   stores one fact in the [`Context`].
//! - **Transform** ([`TransformPass`]): rewrites the tree, memoized per node
//!   identity *and* the binder frames the node can see.
//!
//! Both route each node to a handler chosen by its [`Kind`](tess_ir::Kind)
//! through a [`Dispatch`] table built explicitly with a builder; kinds
//! without a handler fall back to a default that recurses into children
//! and the node's type.
//!
//! Passes declare the fact kinds they require and produce. The manager
//! checks both around every pass and supports fixed-point iteration.

mod analysis;
mod context;
mod dispatch;
mod fact;
mod manager;
mod transform;

pub use analysis::{AnalysisPass, AnalysisPassBuilder, AnalyzeFn, Analyzer, NodeFacts};
pub use context::Context;
pub use dispatch::Dispatch;
pub use fact::FactKind;
pub use manager::{Pass, PassManager, DEFAULT_MAX_ITERATIONS};
pub use transform::{FrameId, RewriteFn, Rewriter, TransformPass, TransformPassBuilder};
