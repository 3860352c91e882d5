//! Witness propagation.
//!
//! | Constructor | finite | ordered | decomposition |
//! |---|---|---|---|
//! | `Fin(n)` | yes | yes | none |
//! | `Universe(T)` | iff `T` is `unit` or an enum | no | none |
//! | `CartProd`, `DisjUnion` | all components | all components | the components |
//! | `Restrict(d, p)` | as `d` | as `d` | as `d` |
//! | `DomProj(d, i)` | as component `i` | as component `i` | none |
//! | `Slice`, `Windows`, `Tiles` | yes | yes | none, plus a derived `Fin(N)` |
//!
//! Any other domain-valued node (a variable, a bound parameter, an
//! application) is judged from its type. Non-domain nodes have no witness.

use smallvec::SmallVec;
use tess_canon::ConstFold;
use tess_ir::construct::{domain_parts, fin};
use tess_ir::{Capability, CompileError, Kind, Node};
use tess_pass::{AnalysisPass, Analyzer, Context, NodeFacts};

use crate::Witness;

type Inference<'a> = Analyzer<'a, Option<Witness>>;

/// Witness of every domain-valued node of one term.
#[derive(Debug)]
pub struct DomainFacts {
    facts: NodeFacts<Option<Witness>>,
}

impl DomainFacts {
    pub fn witness(&self, d: &Node) -> Option<&Witness> {
        self.facts.get(d).and_then(Option::as_ref)
    }

    /// The `Fin(N)` index domain derived for a windowing operator.
    pub fn derived(&self, d: &Node) -> Option<&Node> {
        self.witness(d).and_then(|w| w.derived.as_ref())
    }

    /// Number of domain-valued nodes with a witness.
    pub fn len(&self) -> usize {
        self.facts.iter().filter(|(_, w)| w.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The domain attribute analysis.
pub struct DomainInference;

impl DomainInference {
    pub const NAME: &'static str = "domain-inference";

    pub fn pass() -> AnalysisPass<Option<Witness>, DomainFacts> {
        let mut builder = AnalysisPass::builder(Self::NAME, |_, facts| DomainFacts { facts })
            .handle(Kind::Fin, infer_fin)
            .handle(Kind::Universe, infer_universe)
            .handle(Kind::CartProd, infer_composite)
            .handle(Kind::DisjUnion, infer_composite)
            .handle(Kind::Restrict, infer_restrict)
            .handle(Kind::DomProj, infer_dom_proj);
        for kind in [Kind::Slice, Kind::Windows, Kind::Tiles] {
            builder = builder.handle(kind, infer_windowed);
        }
        for kind in [
            Kind::Var,
            Kind::BoundVar,
            Kind::Apply,
            Kind::Ite,
            Kind::Proj,
            Kind::Match,
        ] {
            builder = builder.handle(kind, infer_from_type);
        }
        builder.build()
    }

    /// Infer the witnesses of `root` outside any pipeline.
    pub fn run(root: &Node) -> Result<DomainFacts, CompileError> {
        Self::pass().analyze(root, &Context::new())
    }
}

/// Cardinality of `d`, if its type records one that folds to a literal.
pub fn cardinality(d: &Node) -> Option<i64> {
    let (_, card) = domain_parts(d).ok()?;
    ConstFold::run(card?).ok()?.as_int()
}

/// Witness of an operand that must be a domain.
fn operand(an: &mut Inference<'_>, d: &Node) -> Result<Witness, CompileError> {
    an.visit(d)?
        .ok_or_else(|| CompileError::internal(format!("domain operand {d} has no witness"), [d.clone()]))
}

fn require(op: &Node, d: &Node, holds: bool, required: Capability) -> Result<(), CompileError> {
    if holds {
        Ok(())
    } else {
        Err(CompileError::DomainCapability {
            op: op.kind(),
            required,
            domain: d.clone(),
        })
    }
}

// === Handlers ===

fn infer_fin(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    Ok(Some(Witness::finite_ordered()))
}

fn infer_universe(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    let carrier = node.child(0);
    Ok(Some(Witness {
        is_finite: matches!(carrier.kind(), Kind::UnitT | Kind::EnumT),
        ..Witness::default()
    }))
}

fn infer_composite(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    let mut witness = Witness {
        is_finite: true,
        is_ordered: true,
        decomposition: Some(node.children().iter().cloned().collect::<SmallVec<_>>()),
        derived: None,
    };
    for d in node.children() {
        let component = operand(an, d)?;
        witness.is_finite &= component.is_finite;
        witness.is_ordered &= component.is_ordered;
    }
    Ok(Some(witness))
}

fn infer_restrict(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    let inner = operand(an, node.child(0))?;
    Ok(Some(Witness { derived: None, ..inner }))
}

fn infer_dom_proj(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    let d = node.child(0);
    let index = node.index().unwrap_or_default();
    let product = operand(an, d)?;
    let component = product.component(index as usize).cloned();
    require(node, d, component.is_some(), Capability::Component(index))?;
    match component {
        Some(component) => {
            let inner = operand(an, &component)?;
            Ok(Some(Witness {
                decomposition: None,
                ..inner
            }))
        }
        None => Ok(None),
    }
}

/// `Slice`, `Windows` and `Tiles` need a finite, ordered operand and yield
/// a derived `Fin(N)` counting their elements.
fn infer_windowed(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    let d = node.child(0);
    let inner = operand(an, d)?;
    require(node, d, inner.is_finite, Capability::Finite)?;
    require(node, d, inner.is_ordered, Capability::Ordered)?;

    let (first, second) = (node.int_field(0).unwrap_or_default(), node.int_field(1));
    let (needed, positive) = match node.kind() {
        Kind::Slice => (second.unwrap_or_default(), first >= 0),
        Kind::Windows => (first, first > 0 && second.is_some_and(|stride| stride > 0)),
        _ => (first, first > 0),
    };
    if !positive {
        return Err(CompileError::Malformed {
            kind: node.kind(),
            reason: format!("invalid parameters in {node}"),
        });
    }

    // The operator's own type records its element count.
    let (_, count) = domain_parts(node)?;
    let Some(count) = count else {
        return Err(CompileError::DomainCapability {
            op: node.kind(),
            required: Capability::Finite,
            domain: d.clone(),
        });
    };
    let count = ConstFold::run(count)?;
    let too_short = count.as_int().is_some_and(|n| n < 0) || cardinality(d).is_some_and(|len| len < needed);
    require(node, d, !too_short, Capability::MinLength(needed))?;

    let derived = fin(count);
    tracing::trace!(%node, %derived, "derived index domain");
    an.visit(&derived)?;
    Ok(Some(Witness {
        derived: Some(derived),
        ..Witness::finite_ordered()
    }))
}

fn infer_from_type(an: &mut Inference<'_>, node: &Node) -> Result<Option<Witness>, CompileError> {
    an.visit_children(node)?;
    Ok(if node.is_domain() { Witness::from_type(node) } else { None })
}

#[cfg(test)]
mod tests;
