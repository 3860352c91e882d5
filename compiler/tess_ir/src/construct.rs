//! Typed node constructors.
//!
//! Every value carries its type, and several types mention values (a
//! domain's cardinality, a Pi type's body). These helpers compute the type
//! from the operands so callers never assemble dependent types by hand.
//!
//! Types are derived by [`result_type`]; the type checker reuses it to
//! recompute the expected type of a node after rewriting.
//!
//! # Panics
//!
//! The constructors panic on malformed input (wrong operand sorts, a
//! domain operator applied to a non-domain). A malformed node is a bug in
//! the calling builder, never a property of the term being compiled.

use std::sync::Arc;

use crate::{BinderArena, BinderId, CompileError, Field, Kind, Literal, Name, Node, VarId};

// === Type Derivation ===

/// The type of a `kind` node with these fields and children.
///
/// Returns `Ok(None)` for type constructors (types are untyped) and for
/// constructors whose type cannot be read off the operands: `EnumLit`,
/// `Var`, `Placeholder`, `BoundVar` and `Inj` are annotated by their
/// creator, `Apply` needs substitution (see `tess_bind::apply_type`).
pub fn result_type(kind: Kind, fields: &[Field], children: &[Node]) -> Result<Option<Node>, CompileError> {
    let ty = match kind {
        _ if kind.is_type() => return Ok(None),
        Kind::EnumLit | Kind::Var | Kind::Placeholder | Kind::BoundVar | Kind::Inj | Kind::Apply => {
            return Ok(None);
        }

        Kind::Lit => match fields {
            [Field::Literal(Literal::Unit)] => unit_t(),
            [Field::Literal(Literal::Bool(_))] => bool_t(),
            [Field::Literal(Literal::Int(_))] => int_t(),
            _ => return Err(malformed(kind, "literal without a literal field")),
        },

        Kind::Lambda => {
            let [param, body] = children else {
                return Err(malformed(kind, "expected a parameter type and a body"));
            };
            let binder = binder_field(fields);
            pi_t(binder, param.clone(), type_of(body)?.clone())
        }

        Kind::Not
        | Kind::And
        | Kind::Or
        | Kind::Implies
        | Kind::Eq
        | Kind::Lt
        | Kind::Le
        | Kind::Forall
        | Kind::Exists => bool_t(),

        Kind::Add
        | Kind::Mul
        | Kind::Sub
        | Kind::Neg
        | Kind::Div
        | Kind::Mod
        | Kind::SumOver
        | Kind::Count
        | Kind::Card => int_t(),

        Kind::Ite => type_of(operand(kind, children, 1)?)?.clone(),

        Kind::TupleVal => {
            let items = children.iter().map(|c| type_of(c).cloned()).collect::<Result<Vec<_>, _>>()?;
            tuple_t(items)
        }

        Kind::Proj => {
            let tuple = operand(kind, children, 0)?;
            let ty = type_of(tuple)?;
            let index = index_field(fields);
            match ty.kind() {
                Kind::TupleT if (index as usize) < ty.children().len() => ty.child(index as usize).clone(),
                _ => {
                    return Err(CompileError::type_mismatch(
                        tuple,
                        format!("a tuple with a component #{index}"),
                        ty,
                    ));
                }
            }
        }

        Kind::Match => match_result_type(children)?,

        Kind::Fin => dom_t(int_t(), Some(operand(kind, children, 0)?.clone())),

        Kind::Universe => {
            let carrier = operand(kind, children, 0)?;
            let card = match carrier.kind() {
                Kind::UnitT => Some(int(1)),
                Kind::EnumT => carrier.labels().map(|labels| int(len_i64(labels.len()))),
                _ => None,
            };
            dom_t(carrier.clone(), card)
        }

        Kind::CartProd | Kind::DisjUnion => {
            let mut carriers = Vec::with_capacity(children.len());
            let mut cards = Vec::with_capacity(children.len());
            for d in children {
                let (carrier, card) = domain_parts(d)?;
                carriers.push(carrier.clone());
                cards.push(card.cloned());
            }
            let cards: Option<Vec<Node>> = cards.into_iter().collect();
            if kind == Kind::CartProd {
                dom_t(tuple_t(carriers), cards.map(mul))
            } else {
                dom_t(sum_t(carriers), cards.map(add))
            }
        }

        Kind::Restrict => {
            let [d, pred] = children else {
                return Err(malformed(kind, "expected a domain and a predicate"));
            };
            let (carrier, card) = domain_parts(d)?;
            let card = card.map(|_| count(d.clone(), pred.clone()));
            dom_t(carrier.clone(), card)
        }

        Kind::DomProj => {
            let d = operand(kind, children, 0)?;
            let index = index_field(fields) as usize;
            let (carrier, _) = domain_parts(d)?;
            if carrier.kind() != Kind::TupleT || index >= carrier.children().len() {
                return Err(CompileError::type_mismatch(
                    d,
                    format!("a product domain with a component #{index}"),
                    carrier,
                ));
            }
            let card = if d.kind() == Kind::CartProd {
                domain_parts(d.child(index))?.1.cloned()
            } else {
                None
            };
            dom_t(carrier.child(index).clone(), card)
        }

        Kind::Slice => {
            domain_parts(operand(kind, children, 0)?)?;
            let (lo, hi) = (int_field(fields, 0), int_field(fields, 1));
            dom_t(int_t(), Some(int(hi - lo)))
        }

        Kind::Windows => {
            let (_, card) = domain_parts(operand(kind, children, 0)?)?;
            let (size, stride) = (int_field(fields, 0), int_field(fields, 1));
            let count = card.map(|len| div(sub(len.clone(), int(size - stride)), int(stride)));
            dom_t(int_t(), count)
        }

        Kind::Tiles => {
            let (_, card) = domain_parts(operand(kind, children, 0)?)?;
            let size = int_field(fields, 0);
            dom_t(int_t(), card.map(|len| div(len.clone(), int(size))))
        }

        _ => return Ok(None),
    };
    Ok(Some(ty))
}

/// Carrier type and optional cardinality of a domain-typed value.
pub fn domain_parts(d: &Node) -> Result<(&Node, Option<&Node>), CompileError> {
    let ty = type_of(d)?;
    if ty.kind() != Kind::DomT {
        return Err(CompileError::type_mismatch(d, "a domain", ty));
    }
    Ok((ty.child(0), ty.children().get(1)))
}

fn type_of(node: &Node) -> Result<&Node, CompileError> {
    node.ty()
        .ok_or_else(|| CompileError::internal("value operand without a type", [node.clone()]))
}

fn operand(kind: Kind, children: &[Node], index: usize) -> Result<&Node, CompileError> {
    children
        .get(index)
        .ok_or_else(|| malformed(kind, format!("missing operand #{index}")))
}

fn malformed(kind: Kind, reason: impl Into<String>) -> CompileError {
    CompileError::Malformed {
        kind,
        reason: reason.into(),
    }
}

fn binder_field(fields: &[Field]) -> Option<BinderId> {
    fields.iter().find_map(|f| match f {
        Field::Binder(id) => *id,
        _ => None,
    })
}

fn index_field(fields: &[Field]) -> u32 {
    fields
        .iter()
        .find_map(|f| match f {
            Field::Index(i) => Some(*i),
            _ => None,
        })
        .unwrap_or_default()
}

fn int_field(fields: &[Field], position: usize) -> i64 {
    fields
        .iter()
        .filter_map(|f| match f {
            Field::Int(n) => Some(*n),
            _ => None,
        })
        .nth(position)
        .unwrap_or_default()
}

/// Arms are functions of the component; their result type must not
/// mention the bound component.
fn match_result_type(children: &[Node]) -> Result<Node, CompileError> {
    let arm = operand(Kind::Match, children, 1)?;
    let pi = type_of(arm)?;
    if pi.kind() != Kind::PiT {
        return Err(CompileError::type_mismatch(arm, "a function arm", pi));
    }
    let result = pi.child(1);
    if result.free_depth() > 0 || result.flags().has_hoas() {
        return Err(malformed(
            Kind::Match,
            format!("arm result type {result} depends on the matched component"),
        ));
    }
    Ok(result.clone())
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Build a value whose type is derived from its operands.
fn derived(kind: Kind, fields: impl IntoIterator<Item = Field>, children: impl IntoIterator<Item = Node>) -> Node {
    let fields: Vec<Field> = fields.into_iter().collect();
    let children: Vec<Node> = children.into_iter().collect();
    let ty = match result_type(kind, &fields, &children) {
        Ok(Some(ty)) => ty,
        Ok(None) => panic!("`{kind}` has no derivable type"),
        Err(err) => panic!("{err}"),
    };
    Node::new(kind, fields, children, Some(ty))
}

fn op(kind: Kind, children: impl IntoIterator<Item = Node>) -> Node {
    derived(kind, [], children)
}

// === Types ===

pub fn unit_t() -> Node {
    Node::new(Kind::UnitT, [], [], None)
}

pub fn bool_t() -> Node {
    Node::new(Kind::BoolT, [], [], None)
}

pub fn int_t() -> Node {
    Node::new(Kind::IntT, [], [], None)
}

pub fn enum_t(name: Name, labels: impl IntoIterator<Item = Name>) -> Node {
    let labels: Arc<[Name]> = labels.into_iter().collect();
    Node::new(Kind::EnumT, [Field::Label(name), Field::Labels(labels)], [], None)
}

pub fn tuple_t(items: impl IntoIterator<Item = Node>) -> Node {
    Node::new(Kind::TupleT, [], items, None)
}

pub fn sum_t(items: impl IntoIterator<Item = Node>) -> Node {
    Node::new(Kind::SumT, [], items, None)
}

/// Domain type; `card` is present iff the domain is finite.
pub fn dom_t(carrier: Node, card: Option<Node>) -> Node {
    Node::new(Kind::DomT, [], std::iter::once(carrier).chain(card), None)
}

/// Dependent function type. `binder` is `Some` for a HOAS body.
pub fn pi_t(binder: Option<BinderId>, param: Node, body: Node) -> Node {
    Node::new(Kind::PiT, [Field::Binder(binder)], [param, body], None)
}

/// Residual type-level application.
pub fn apply_t(pi: Node, arg: Node) -> Node {
    Node::new(Kind::ApplyT, [], [pi, arg], None)
}

// === Leaves ===

pub fn unit() -> Node {
    Node::new(Kind::Lit, [Field::Literal(Literal::Unit)], [], Some(unit_t()))
}

pub fn bool_lit(value: bool) -> Node {
    Node::new(Kind::Lit, [Field::Literal(Literal::Bool(value))], [], Some(bool_t()))
}

pub fn int(value: i64) -> Node {
    Node::new(Kind::Lit, [Field::Literal(Literal::Int(value))], [], Some(int_t()))
}

/// Enumeration literal of the enum type `ty`.
pub fn enum_lit(label: Name, ty: Node) -> Node {
    Node::new(Kind::EnumLit, [Field::Label(label)], [], Some(ty))
}

pub fn var(id: VarId, ty: Node) -> Node {
    Node::new(Kind::Var, [Field::Var(id)], [], Some(ty))
}

pub fn placeholder(binder: BinderId, ty: Node) -> Node {
    Node::new(Kind::Placeholder, [Field::Binder(Some(binder))], [], Some(ty))
}

/// De Bruijn use of the `index`-th enclosing binder.
pub fn bound(index: u32, ty: Node) -> Node {
    Node::new(Kind::BoundVar, [Field::Index(index)], [], Some(ty))
}

// === Functions ===

/// Lambda over `param`. `binder` is `Some` when `body` refers to the
/// parameter through placeholders, `None` when it uses `BoundVar(0)`.
pub fn lambda(binder: Option<BinderId>, param: Node, body: Node) -> Node {
    derived(Kind::Lambda, [Field::Binder(binder)], [param, body])
}

/// HOAS lambda: `body` receives the arena (for nested binders) and the
/// parameter's placeholder.
pub fn lambda_with(
    arena: &mut BinderArena,
    param: Node,
    body: impl FnOnce(&mut BinderArena, Node) -> Node,
) -> Node {
    let binder = arena.fresh();
    let x = placeholder(binder, param.clone());
    let body = body(arena, x);
    lambda(Some(binder), param, body)
}

/// HOAS Pi type: `body` receives the arena and the parameter's placeholder.
pub fn pi_with(
    arena: &mut BinderArena,
    param: Node,
    body: impl FnOnce(&mut BinderArena, Node) -> Node,
) -> Node {
    let binder = arena.fresh();
    let x = placeholder(binder, param.clone());
    let body = body(arena, x);
    pi_t(Some(binder), param, body)
}

// === Logic and arithmetic ===

pub fn not(a: Node) -> Node {
    op(Kind::Not, [a])
}

pub fn and(items: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::And, items)
}

pub fn or(items: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::Or, items)
}

pub fn implies(a: Node, b: Node) -> Node {
    op(Kind::Implies, [a, b])
}

pub fn add(items: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::Add, items)
}

pub fn mul(items: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::Mul, items)
}

pub fn sub(a: Node, b: Node) -> Node {
    op(Kind::Sub, [a, b])
}

pub fn neg(a: Node) -> Node {
    op(Kind::Neg, [a])
}

pub fn div(a: Node, b: Node) -> Node {
    op(Kind::Div, [a, b])
}

pub fn modulo(a: Node, b: Node) -> Node {
    op(Kind::Mod, [a, b])
}

pub fn eq(a: Node, b: Node) -> Node {
    op(Kind::Eq, [a, b])
}

pub fn lt(a: Node, b: Node) -> Node {
    op(Kind::Lt, [a, b])
}

pub fn le(a: Node, b: Node) -> Node {
    op(Kind::Le, [a, b])
}

pub fn ite(cond: Node, then: Node, otherwise: Node) -> Node {
    op(Kind::Ite, [cond, then, otherwise])
}

// === Algebraic data ===

pub fn tuple(items: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::TupleVal, items)
}

pub fn proj(tuple: Node, index: u32) -> Node {
    derived(Kind::Proj, [Field::Index(index)], [tuple])
}

/// Injection into component `index` of the sum type `ty`.
pub fn inj(index: u32, value: Node, ty: Node) -> Node {
    Node::new(Kind::Inj, [Field::Index(index)], [value], Some(ty))
}

/// Case analysis; one function arm per component of the scrutinee's sum.
pub fn match_on(scrutinee: Node, arms: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::Match, std::iter::once(scrutinee).chain(arms))
}

// === Domains ===

pub fn fin(n: Node) -> Node {
    op(Kind::Fin, [n])
}

pub fn universe(carrier: Node) -> Node {
    op(Kind::Universe, [carrier])
}

pub fn cart_prod(factors: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::CartProd, factors)
}

pub fn disj_union(parts: impl IntoIterator<Item = Node>) -> Node {
    op(Kind::DisjUnion, parts)
}

pub fn restrict(d: Node, pred: Node) -> Node {
    op(Kind::Restrict, [d, pred])
}

pub fn dom_proj(d: Node, index: u32) -> Node {
    derived(Kind::DomProj, [Field::Index(index)], [d])
}

pub fn slice(d: Node, lo: i64, hi: i64) -> Node {
    derived(Kind::Slice, [Field::Int(lo), Field::Int(hi)], [d])
}

pub fn windows(d: Node, size: i64, stride: i64) -> Node {
    derived(Kind::Windows, [Field::Int(size), Field::Int(stride)], [d])
}

pub fn tiles(d: Node, size: i64) -> Node {
    derived(Kind::Tiles, [Field::Int(size)], [d])
}

// === Quantifiers and collections ===

pub fn forall(d: Node, pred: Node) -> Node {
    op(Kind::Forall, [d, pred])
}

pub fn exists(d: Node, pred: Node) -> Node {
    op(Kind::Exists, [d, pred])
}

pub fn sum_over(d: Node, f: Node) -> Node {
    op(Kind::SumOver, [d, f])
}

pub fn count(d: Node, pred: Node) -> Node {
    op(Kind::Count, [d, pred])
}

pub fn card(d: Node) -> Node {
    op(Kind::Card, [d])
}
