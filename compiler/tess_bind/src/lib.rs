//! Tessera binding model and substitution engine.
//!
//! Terms are built in HOAS form (binders identified by arena handles,
//! uses by [`Placeholder`](tess_ir::Kind::Placeholder) nodes) and enter the
//! pipeline in de Bruijn form (uses are `BoundVar(k)`, counting enclosing
//! binders). This crate converts between the two and implements the
//! substitution algebra over both:
//!
//! - [`resolve_bindings`]: HOAS → de Bruijn, once per top-level term
//! - [`ensure_resolved`]: post-resolution HOAS scan
//! - [`shift`], [`subst`], [`subst_binder`]: the primitives
//! - [`beta_reduce`], [`apply_type`], [`beta_normalize`]: reduction
//!
//! Every primitive rewrites a node's type together with its children: a
//! type can mention values and bound variables (a domain's cardinality, a
//! Pi type's body).

mod beta;
mod hoas;
mod resolve;
mod shift;
mod subst;

pub use beta::{apply, apply_type, beta_normalize, beta_reduce};
pub use hoas::{ensure_resolved, first_hoas};
pub use resolve::resolve_bindings;
pub use shift::shift;
pub use subst::{subst, subst_binder};
