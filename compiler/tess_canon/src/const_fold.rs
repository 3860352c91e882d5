//! Constant folding.
//!
//! Folds literal arithmetic, boolean connectives and comparisons, picks the
//! branch of an `Ite` with a literal condition, projects out of literal
//! tuples, matches literal injections, and reads `Card` off a domain whose
//! type records a literal cardinality.
//!
//! Folding is bottom-up: each handler rewrites the operands first and then
//! folds the rebuilt node at its root. A node that does not fold is
//! returned as is, so an already folded tree keeps its identity.
//!
//! # Integer Semantics
//!
//! `Div` and `Mod` round toward negative infinity (the remainder takes the
//! divisor's sign). Division by a literal zero and any overflowing
//! operation stay residual: folding never changes the meaning of a term.

use tess_bind::{apply, beta_reduce};
use tess_ir::construct::{add, and, bool_lit, domain_parts, int, mul, not, or};
use tess_ir::{Children, CompileError, Kind, Node};
use tess_pass::{Context, Rewriter, TransformPass};

/// Kinds with a folding rule.
const FOLDED: &[Kind] = &[
    Kind::Add,
    Kind::Mul,
    Kind::Sub,
    Kind::Neg,
    Kind::Div,
    Kind::Mod,
    Kind::Not,
    Kind::And,
    Kind::Or,
    Kind::Implies,
    Kind::Eq,
    Kind::Lt,
    Kind::Le,
    Kind::Ite,
    Kind::Proj,
    Kind::Match,
    Kind::Card,
];

/// The constant-folding transform.
pub struct ConstFold;

impl ConstFold {
    pub const NAME: &'static str = "const-fold";

    /// The transform as a schedulable pass.
    pub fn pass() -> TransformPass {
        FOLDED
            .iter()
            .fold(TransformPass::builder(Self::NAME), |builder, &kind| {
                builder.handle(kind, fold)
            })
            .build()
    }

    /// Fold `root` once, outside any pipeline.
    pub fn run(root: &Node) -> Result<Node, CompileError> {
        Self::pass().rewrite(root, &Context::new())
    }
}

fn fold(rw: &mut Rewriter<'_>, node: &Node) -> Result<Node, CompileError> {
    let node = rw.rewrite_children(node)?;
    let folded = fold_root(&node)?;
    if node.kind() == Kind::Match && !Node::ptr_eq(&folded, &node) {
        // The matched arm was substituted into and may fold further.
        return rw.visit(&folded);
    }
    Ok(folded)
}

/// Fold `node` at its root, assuming its operands are already folded.
pub fn fold_root(node: &Node) -> Result<Node, CompileError> {
    let folded = match node.kind() {
        Kind::Add => fold_arith(node, 0, i64::checked_add, None),
        Kind::Mul => fold_arith(node, 1, i64::checked_mul, Some(0)),
        Kind::And => fold_logic(node, true),
        Kind::Or => fold_logic(node, false),
        Kind::Sub => fold_sub(node),
        Kind::Neg => fold_neg(node),
        Kind::Div => fold_binary(node, floor_div),
        Kind::Mod => fold_binary(node, floor_mod),
        Kind::Not => fold_not(node),
        Kind::Implies => fold_implies(node),
        Kind::Eq | Kind::Lt | Kind::Le => fold_compare(node),
        Kind::Ite => fold_ite(node),
        Kind::Proj => fold_proj(node),
        Kind::Match => fold_match(node),
        Kind::Card => return fold_card(node),
        _ => None,
    };
    Ok(folded.unwrap_or_else(|| node.clone()))
}

// === Arithmetic ===

/// Operands of an AC node, with nested same-operator nodes spliced in.
fn operands(node: &Node) -> (Children, bool) {
    let mut flat = Children::new();
    let mut spliced = false;
    for child in node.children() {
        if child.kind() == node.kind() {
            flat.extend(child.children().iter().cloned());
            spliced = true;
        } else {
            flat.push(child.clone());
        }
    }
    (flat, spliced)
}

fn fold_arith(node: &Node, unit: i64, combine: fn(i64, i64) -> Option<i64>, absorbing: Option<i64>) -> Option<Node> {
    let (flat, spliced) = operands(node);
    let mut acc = unit;
    let mut literals = 0;
    let mut rest = Children::new();
    for operand in flat {
        match operand.as_int() {
            Some(n) => {
                acc = combine(acc, n)?;
                literals += 1;
            }
            None => rest.push(operand),
        }
    }
    if literals > 0 && absorbing == Some(acc) {
        return Some(int(acc));
    }
    if !spliced && (literals == 0 || literals == 1 && acc != unit) {
        return None;
    }

    let build: fn(Children) -> Node = if node.kind() == Kind::Add { add } else { mul };
    Some(match (rest.len(), acc == unit) {
        (0, _) => int(acc),
        (1, true) => rest.remove(0),
        (_, true) => build(rest),
        (_, false) => {
            rest.insert(0, int(acc));
            build(rest)
        }
    })
}

fn fold_sub(node: &Node) -> Option<Node> {
    let (a, b) = (node.child(0), node.child(1));
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => x.checked_sub(y).map(int),
        (_, Some(0)) => Some(a.clone()),
        _ if a == b => Some(int(0)),
        _ => None,
    }
}

fn fold_neg(node: &Node) -> Option<Node> {
    let a = node.child(0);
    match a.as_int() {
        Some(x) => x.checked_neg().map(int),
        None if a.kind() == Kind::Neg => Some(a.child(0).clone()),
        None => None,
    }
}

fn fold_binary(node: &Node, op: fn(i64, i64) -> Option<i64>) -> Option<Node> {
    let (a, b) = (node.child(0), node.child(1));
    match (a.as_int(), b.as_int()) {
        (Some(x), Some(y)) => op(x, y).map(int),
        (_, Some(1)) if node.kind() == Kind::Div => Some(a.clone()),
        (_, Some(1)) => Some(int(0)),
        _ => None,
    }
}

/// Division rounding toward negative infinity; `None` on zero or overflow.
pub fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder with the divisor's sign; `None` on zero or overflow.
pub fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        Some(r + b)
    } else {
        Some(r)
    }
}

// === Logic ===

/// `And` when `unit` is true, `Or` when it is false.
fn fold_logic(node: &Node, unit: bool) -> Option<Node> {
    let (flat, spliced) = operands(node);
    let before = flat.len();
    let mut rest = Children::new();
    for operand in flat {
        match operand.as_bool() {
            Some(b) if b != unit => return Some(bool_lit(b)),
            Some(_) => {}
            None => rest.push(operand),
        }
    }
    if !spliced && rest.len() == before {
        return None;
    }
    let build: fn(Children) -> Node = if unit { and } else { or };
    Some(match rest.len() {
        0 => bool_lit(unit),
        1 => rest.remove(0),
        _ => build(rest),
    })
}

fn fold_not(node: &Node) -> Option<Node> {
    let a = node.child(0);
    match a.as_bool() {
        Some(b) => Some(bool_lit(!b)),
        None if a.kind() == Kind::Not => Some(a.child(0).clone()),
        None => None,
    }
}

fn fold_implies(node: &Node) -> Option<Node> {
    let (a, b) = (node.child(0), node.child(1));
    match (a.as_bool(), b.as_bool()) {
        (Some(false), _) | (_, Some(true)) => Some(bool_lit(true)),
        (Some(true), _) => Some(b.clone()),
        (_, Some(false)) => Some(not(a.clone())),
        _ if a == b => Some(bool_lit(true)),
        _ => None,
    }
}

// === Comparisons ===

fn fold_compare(node: &Node) -> Option<Node> {
    let (a, b) = (node.child(0), node.child(1));
    let kind = node.kind();
    if a == b {
        return Some(bool_lit(kind != Kind::Lt));
    }
    if let (Some(x), Some(y)) = (a.as_int(), b.as_int()) {
        return Some(bool_lit(match kind {
            Kind::Lt => x < y,
            Kind::Le => x <= y,
            _ => x == y,
        }));
    }
    if kind != Kind::Eq {
        return None;
    }
    // Distinct literals (or two labels of one enum) are distinct values.
    let distinct_literals = matches!((a.literal(), b.literal()), (Some(x), Some(y)) if x != y);
    let distinct_labels = a.kind() == Kind::EnumLit && b.kind() == Kind::EnumLit && a.label() != b.label();
    (distinct_literals || distinct_labels).then(|| bool_lit(false))
}

// === Control and data ===

fn fold_ite(node: &Node) -> Option<Node> {
    let (cond, then, otherwise) = (node.child(0), node.child(1), node.child(2));
    match cond.as_bool() {
        Some(true) => Some(then.clone()),
        Some(false) => Some(otherwise.clone()),
        None if then == otherwise => Some(then.clone()),
        None => None,
    }
}

fn fold_proj(node: &Node) -> Option<Node> {
    let tuple = node.child(0);
    let index = node.index()? as usize;
    (tuple.kind() == Kind::TupleVal)
        .then(|| tuple.children().get(index).cloned())
        .flatten()
}

fn fold_match(node: &Node) -> Option<Node> {
    let scrutinee = node.child(0);
    if scrutinee.kind() != Kind::Inj {
        return None;
    }
    let arm = node.children().get(1 + scrutinee.index()? as usize)?;
    Some(beta_reduce(&apply(arm.clone(), scrutinee.child(0).clone())))
}

fn fold_card(node: &Node) -> Result<Node, CompileError> {
    let (_, card) = domain_parts(node.child(0))?;
    Ok(match card.and_then(Node::as_int) {
        Some(n) => int(n),
        None => node.clone(),
    })
}
