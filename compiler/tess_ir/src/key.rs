//! Canonical keys.
//!
//! A canonical key is a structural fingerprint derived purely from the
//! constructor, the fields, the children's keys and the type's key. It is
//! computed bottom-up when a node is built, so telling two subtrees apart
//! is O(1) no matter how much sharing they contain.
//!
//! The hash is 64 bits, so equal keys do not prove equal structure. Key
//! equality only ever selects candidates: `Node`'s `PartialEq` and the CSE
//! table confirm a match structurally before treating two terms as one.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::{Field, Kind, Node};

/// Structural fingerprint of a subtree.
///
/// Ordered by `(priority, kind, hash)`: the order used to sort operands of
/// associative-commutative operators.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct CanonKey {
    priority: u8,
    kind: Kind,
    hash: u64,
}

impl CanonKey {
    /// Compute the key of a node from its parts.
    ///
    /// Operands of AC operators are hashed in key order, so `a ∧ b` and
    /// `b ∧ a` get the same key even before CSE reorders them.
    pub(crate) fn compute(kind: Kind, fields: &[Field], children: &[Node], ty: Option<&Node>) -> Self {
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        fields.hash(&mut hasher);
        children.len().hash(&mut hasher);
        if kind.is_ac() {
            let mut keys: SmallVec<[CanonKey; 8]> = children.iter().map(Node::key).collect();
            keys.sort_unstable();
            keys.hash(&mut hasher);
        } else {
            for child in children {
                child.key().hash(&mut hasher);
            }
        }
        ty.map(Node::key).hash(&mut hasher);
        CanonKey {
            priority: kind.priority(),
            kind,
            hash: hasher.finish(),
        }
    }

    #[inline]
    pub const fn kind(self) -> Kind {
        self.kind
    }

    #[inline]
    pub const fn priority(self) -> u8 {
        self.priority
    }

    #[inline]
    pub const fn hash_value(self) -> u64 {
        self.hash
    }
}
