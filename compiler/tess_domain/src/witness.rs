//! The domain attribute witness.

use smallvec::SmallVec;
use tess_ir::construct::domain_parts;
use tess_ir::{Kind, Node};

/// Facts about one domain.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Witness {
    pub is_finite: bool,
    pub is_ordered: bool,
    /// Component domains of a product or union, in order.
    pub decomposition: Option<SmallVec<[Node; 4]>>,
    /// `Fin(N)` index domain synthesized by `Slice`, `Windows` or `Tiles`.
    pub derived: Option<Node>,
}

impl Witness {
    /// A finite, ordered domain with no further structure (`Fin(n)`).
    pub fn finite_ordered() -> Self {
        Witness {
            is_finite: true,
            is_ordered: true,
            ..Witness::default()
        }
    }

    /// Witness read off a domain value's type alone: finite iff the type
    /// records a cardinality, ordered iff the carrier is `int`.
    pub fn from_type(d: &Node) -> Option<Self> {
        let (carrier, card) = domain_parts(d).ok()?;
        Some(Witness {
            is_finite: card.is_some(),
            is_ordered: carrier.kind() == Kind::IntT,
            ..Witness::default()
        })
    }

    /// The `index`-th component domain, if this witness has one.
    pub fn component(&self, index: usize) -> Option<&Node> {
        self.decomposition.as_ref()?.get(index)
    }
}

#[cfg(test)]
mod tests;
