//! Tessera canonicalization.
//!
//! Turns a resolved de Bruijn term into canonical IR:
//!
//! - [`cse`] / [`Cse`]: flatten and sort associative-commutative operands,
//!   then share every structurally identical subtree
//! - [`const_fold`]: fold literal arithmetic, logic and comparisons
//! - [`simplify`]: reduce every beta redex
//! - [`normalize`]: beta-normalize and fold to a fixed point, the normal
//!   form used to compare dependent types
//! - [`validate()`]: check the invariants of the result
//!
//! # Canonical Form
//!
//! Canonical IR is closed (no free `BoundVar`), HOAS-free, has flattened
//! and key-sorted AC operands, and shares every closed subtree.

pub mod const_fold;
mod cse;
mod normalize;
pub mod simplify;
mod validate;

pub use const_fold::ConstFold;
pub use cse::{cse, Cse, CsePass};
pub use normalize::normalize;
pub use simplify::BetaSimplify;
pub use validate::validate;
