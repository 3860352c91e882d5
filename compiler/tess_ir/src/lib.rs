//! Tessera IR - the immutable term representation.
//!
//! This crate contains the core data structures shared by every Tessera
//! compiler stage:
//! - [`Node`]: an immutable, structurally keyed term (types and values)
//! - [`Kind`]: the closed set of constructors and their signatures
//! - [`BinderArena`]: HOAS binder handles
//! - [`CompileError`]: the single fatal error type
//! - [`construct`]: typed constructors that derive dependent types
//!
//! # Design Philosophy
//!
//! - **Immutable**: nodes are never mutated; edits rebuild and share.
//! - **Keyed**: every node caches its canonical key, so equality and
//!   hashing are O(1).
//! - **Flagged**: presence flags let traversals skip closed subtrees.
//! - **Intern Names**: enum names and labels are `Name(u32)` handles.

mod binder;
pub mod construct;
mod error;
mod field;
mod flags;
mod format;
mod interner;
mod key;
mod kind;
mod name;
mod node;
mod stack;

pub use binder::{BinderArena, BinderId};
pub use error::{Capability, CompileError, ErrorCode};
pub use field::{Field, FieldKind, Literal, VarId};
pub use flags::NodeFlags;
pub use interner::{SharedInterner, StringInterner};
pub use key::CanonKey;
pub use kind::{Arity, Kind, Sort};
pub use name::Name;
pub use node::{Children, Fields, Node, NodeAddr};
pub use stack::ensure_sufficient_stack;

// Nodes are shared across rayon workers by batch compilation.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Node>();
};
