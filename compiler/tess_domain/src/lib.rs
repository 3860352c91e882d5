//! Tessera domain attribute inference.
//!
//! Every domain-valued node gets a [`Witness`] recording whether the domain
//! is finite, whether it is ordered, and (for products and unions) the
//! component domains it was built from. Windowing operators consult the
//! witness of their operand and manufacture a derived `Fin(N)` index
//! domain, which is inferred before the operator's own witness is
//! returned.

mod infer;
mod witness;

pub use infer::{cardinality, DomainFacts, DomainInference};
pub use witness::Witness;
