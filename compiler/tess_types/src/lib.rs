//! Tessera typing.
//!
//! - [`types_equal`]: equality of dependent types by normal form
//! - [`TypeCheck`]: the analysis pass that checks every value against its
//!   constructor's signature and produces [`TypeFacts`]
//! - [`SymbolTable`], [`TypeEnv`], [`RoleEnv`]: facts injected by the
//!   embedding that builds terms; the compiler reads them, never builds them
//!
//! Types mention values (a domain type records its cardinality, a Pi type
//! body may use its parameter), so two types are equal when they agree
//! after beta reduction and constant folding, not when they agree
//! syntactically.

mod check;
mod env;
mod equal;

pub use check::{TypeCheck, TypeFacts};
pub use env::{Role, RoleEnv, Symbol, SymbolTable, TypeEnv, Visibility};
pub use equal::types_equal;
