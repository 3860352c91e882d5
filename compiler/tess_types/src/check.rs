//! Type checking.
//!
//! Every value is checked bottom-up against its constructor's signature:
//! operand types first, then the node's recorded type against the type its
//! constructor derives from the (already checked) operands. The per-node
//! fact is the node's type in normal form.
//!
//! Symbolic variables are checked against the injected [`TypeEnv`]; bound
//! variables against the parameter type of the lambda that binds them.

use rustc_hash::FxHashSet;
use tess_bind::shift;
use tess_canon::normalize;
use tess_ir::construct::{apply_t, bool_t, domain_parts, int_t, result_type};
use tess_ir::{ensure_sufficient_stack, CompileError, Kind, Node, NodeAddr};
use tess_pass::{AnalysisPass, Analyzer, NodeFacts};

use crate::{types_equal, TypeEnv};

type Checker<'a> = Analyzer<'a, Option<Node>>;

/// Normal-form type of every checked value.
#[derive(Debug)]
pub struct TypeFacts {
    facts: NodeFacts<Option<Node>>,
}

impl TypeFacts {
    /// Normal form of `node`'s type, if `node` is a checked value.
    pub fn normalized(&self, node: &Node) -> Option<&Node> {
        self.facts.get(node).and_then(Option::as_ref)
    }

    /// Number of nodes visited, types included.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// The type-checking analysis.
pub struct TypeCheck;

impl TypeCheck {
    pub const NAME: &'static str = "type-check";

    pub fn pass() -> AnalysisPass<Option<Node>, TypeFacts> {
        let mut builder = AnalysisPass::builder(Self::NAME, |_, facts| TypeFacts { facts })
            .requires::<TypeEnv>()
            .handle(Kind::Var, check_var)
            .handle(Kind::EnumLit, check_enum_lit)
            .handle(Kind::Apply, check_apply)
            .handle(Kind::Lambda, check_lambda)
            .handle(Kind::Eq, check_eq)
            .handle(Kind::Ite, check_ite)
            .handle(Kind::Inj, check_inj)
            .handle(Kind::Match, check_match)
            .handle(Kind::SumOver, check_binder_op)
            .handle(Kind::Card, check_card);
        for kind in [Kind::Not, Kind::And, Kind::Or, Kind::Implies] {
            builder = builder.handle(kind, check_logic);
        }
        for kind in [
            Kind::Add,
            Kind::Mul,
            Kind::Sub,
            Kind::Neg,
            Kind::Div,
            Kind::Mod,
            Kind::Lt,
            Kind::Le,
            Kind::Fin,
        ] {
            builder = builder.handle(kind, check_arith);
        }
        for kind in [Kind::Forall, Kind::Exists, Kind::Count, Kind::Restrict] {
            builder = builder.handle(kind, check_binder_op);
        }
        for kind in [
            Kind::Lit,
            Kind::BoundVar,
            Kind::TupleVal,
            Kind::Proj,
            Kind::Universe,
            Kind::CartProd,
            Kind::DisjUnion,
            Kind::DomProj,
            Kind::Slice,
            Kind::Windows,
            Kind::Tiles,
        ] {
            builder = builder.handle(kind, check_derived);
        }
        builder.build()
    }
}

// === Helpers ===

fn type_of(node: &Node) -> Result<&Node, CompileError> {
    node.ty()
        .ok_or_else(|| CompileError::internal("value without a type", [node.clone()]))
}

/// `operand`'s type must equal `expected`.
fn expect(operand: &Node, expected: &Node) -> Result<(), CompileError> {
    let found = type_of(operand)?;
    if types_equal(found, expected)? {
        Ok(())
    } else {
        Err(CompileError::type_mismatch(operand, format!("`{expected}`"), found))
    }
}

/// Compare the recorded type with the derived one; yield the normal form.
fn finish(node: &Node) -> Result<Option<Node>, CompileError> {
    let ty = type_of(node)?;
    if let Some(derived) = result_type(node.kind(), node.fields(), node.children())? {
        if !types_equal(&derived, ty)? {
            return Err(CompileError::type_mismatch(node, format!("`{derived}`"), ty));
        }
    }
    normalize(ty).map(Some)
}

// === Handlers ===

fn check_derived(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    finish(node)
}

fn check_logic(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let bool_ty = bool_t();
    for operand in node.children() {
        expect(operand, &bool_ty)?;
    }
    finish(node)
}

fn check_arith(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let int_ty = int_t();
    for operand in node.children() {
        expect(operand, &int_ty)?;
    }
    finish(node)
}

fn check_eq(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    expect(node.child(1), type_of(node.child(0))?)?;
    finish(node)
}

fn check_ite(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    expect(node.child(0), &bool_t())?;
    expect(node.child(2), type_of(node.child(1))?)?;
    finish(node)
}

fn check_var(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let env = an.ctx().get::<TypeEnv>()?;
    let ty = type_of(node)?;
    let declared = node.var_id().and_then(|id| env.lookup(id));
    match declared {
        Some(declared) if types_equal(declared, ty)? => normalize(ty).map(Some),
        Some(declared) => Err(CompileError::type_mismatch(node, format!("`{declared}`"), ty)),
        None => Err(CompileError::type_mismatch(
            node,
            "a variable declared in the type environment",
            ty,
        )),
    }
}

fn check_lambda(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    if node.is_debruijn_scope(1) {
        ParameterUses::new(node.child(0)).walk(node.child(1), 0)?;
    }
    finish(node)
}

/// Scoped walk over a lambda body comparing every use of the parameter
/// with the parameter type.
///
/// A `BoundVar(depth)` under `depth` inner binders refers to the parameter;
/// its annotation lives `depth + 1` binders below the lambda, so the
/// parameter type is shifted by that much before comparing. Subterms that
/// cannot see the parameter are skipped.
struct ParameterUses<'a> {
    param: &'a Node,
    seen: FxHashSet<(NodeAddr, u32)>,
}

impl<'a> ParameterUses<'a> {
    fn new(param: &'a Node) -> Self {
        ParameterUses {
            param,
            seen: FxHashSet::default(),
        }
    }

    fn walk(&mut self, node: &Node, depth: u32) -> Result<(), CompileError> {
        if node.free_depth() <= depth || !self.seen.insert((node.addr(), depth)) {
            return Ok(());
        }
        ensure_sufficient_stack(|| self.walk_uncached(node, depth))
    }

    fn walk_uncached(&mut self, node: &Node, depth: u32) -> Result<(), CompileError> {
        if node.kind() == Kind::BoundVar && node.index() == Some(depth) {
            let expected = shift(self.param, i64::from(depth) + 1, 0);
            let found = type_of(node)?;
            if !types_equal(found, &expected)? {
                return Err(CompileError::type_mismatch(node, format!("`{expected}`"), found));
            }
        }
        if let Some(ty) = node.ty() {
            self.walk(ty, depth)?;
        }
        for (i, child) in node.children().iter().enumerate() {
            let inner = if node.is_debruijn_scope(i) { depth + 1 } else { depth };
            self.walk(child, inner)?;
        }
        Ok(())
    }
}

fn check_enum_lit(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let ty = type_of(node)?;
    let declared = match (ty.labels(), node.label()) {
        (Some(labels), Some(label)) => labels.contains(&label),
        _ => false,
    };
    if !declared {
        return Err(CompileError::type_mismatch(node, "an enum declaring this label", ty));
    }
    normalize(ty).map(Some)
}

fn check_apply(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let (f, arg) = (node.child(0), node.child(1));
    let pi = type_of(f)?;
    if pi.kind() != Kind::PiT {
        return Err(CompileError::type_mismatch(f, "a function", pi));
    }
    expect(arg, pi.child(0))?;

    let ty = type_of(node)?;
    let expected = normalize(&apply_t(pi.clone(), arg.clone()))?;
    if !types_equal(&expected, ty)? {
        return Err(CompileError::type_mismatch(node, format!("`{expected}`"), ty));
    }
    normalize(ty).map(Some)
}

fn check_inj(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let ty = type_of(node)?;
    let index = node.index().unwrap_or_default() as usize;
    match ty.children().get(index) {
        Some(component) if ty.kind() == Kind::SumT => expect(node.child(0), component)?,
        _ => {
            return Err(CompileError::type_mismatch(
                node,
                format!("a sum type with a component #{index}"),
                ty,
            ));
        }
    }
    normalize(ty).map(Some)
}

fn check_match(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let scrutinee = node.child(0);
    let sum = type_of(scrutinee)?;
    let arms = &node.children()[1..];
    if sum.kind() != Kind::SumT || sum.children().len() != arms.len() {
        return Err(CompileError::type_mismatch(
            scrutinee,
            format!("a sum type with {} components", arms.len()),
            sum,
        ));
    }

    let ty = type_of(node)?;
    for (arm, component) in arms.iter().zip(sum.children()) {
        let pi = type_of(arm)?;
        if pi.kind() != Kind::PiT {
            return Err(CompileError::type_mismatch(arm, "a function arm", pi));
        }
        if !types_equal(pi.child(0), component)? {
            return Err(CompileError::type_mismatch(arm, format!("an arm taking `{component}`"), pi));
        }
        let result = pi.child(1);
        if !result.is_closed() || !types_equal(result, ty)? {
            return Err(CompileError::type_mismatch(arm, format!("an arm returning `{ty}`"), pi));
        }
    }
    finish(node)
}

/// `Forall`, `Exists`, `Count`, `Restrict` and `SumOver`: a domain and a
/// function over its elements.
fn check_binder_op(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    let (d, f) = (node.child(0), node.child(1));
    let (carrier, _) = domain_parts(d)?;
    let pi = type_of(f)?;
    let result = if node.kind() == Kind::SumOver { int_t() } else { bool_t() };
    let fits = pi.kind() == Kind::PiT
        && types_equal(pi.child(0), carrier)?
        && pi.child(1).is_closed()
        && types_equal(pi.child(1), &result)?;
    if !fits {
        return Err(CompileError::type_mismatch(
            f,
            format!("a function from `{carrier}` to `{result}`"),
            pi,
        ));
    }
    finish(node)
}

fn check_card(an: &mut Checker<'_>, node: &Node) -> Result<Option<Node>, CompileError> {
    an.visit_children(node)?;
    domain_parts(node.child(0))?;
    finish(node)
}
