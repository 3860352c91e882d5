//! Pre-computed node metadata flags.
//!
//! `NodeFlags` are computed once when a node is constructed, enabling O(1)
//! queries that let traversals skip whole subtrees: substitution skips
//! subterms without bound variables, the HOAS scan skips resolved subterms,
//! beta-normalization skips subterms without redexes.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed node properties.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct NodeFlags: u16 {
        // === Category Flags ===

        /// The node is a type.
        const IS_TYPE = 1 << 0;
        /// The node is a domain value (its type is a `DomT`).
        const IS_DOMAIN = 1 << 1;

        // === Presence Flags ===

        /// Contains a HOAS placeholder or a HOAS binder.
        const HAS_HOAS = 1 << 4;
        /// Contains a de Bruijn `BoundVar` (free or bound).
        const HAS_BOUND = 1 << 5;
        /// Contains a free symbolic `Var`.
        const HAS_VAR = 1 << 6;
        /// Contains a beta redex (`Apply(Lambda, _)` or `ApplyT(PiT, _)`).
        const HAS_REDEX = 1 << 7;
    }
}

impl NodeFlags {
    /// Flags inherited by a parent from its children and its type.
    pub const PROPAGATE_MASK: Self = Self::from_bits_truncate(
        Self::HAS_HOAS.bits() | Self::HAS_BOUND.bits() | Self::HAS_VAR.bits() | Self::HAS_REDEX.bits(),
    );

    /// Presence flags of `child` that propagate to its parent.
    #[inline]
    pub const fn propagate_from(child: Self) -> Self {
        Self::from_bits_truncate(child.bits() & Self::PROPAGATE_MASK.bits())
    }

    #[inline]
    pub const fn has_hoas(self) -> bool {
        self.contains(Self::HAS_HOAS)
    }

    #[inline]
    pub const fn has_redex(self) -> bool {
        self.contains(Self::HAS_REDEX)
    }

    #[inline]
    pub const fn has_vars(self) -> bool {
        self.contains(Self::HAS_VAR)
    }
}
