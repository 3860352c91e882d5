//! End-to-end compilation.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tess_bind::apply;
use tess_ir::construct::{
    add, and, bool_t, bound, cart_prod, count, dom_proj, eq, fin, forall, int, int_t, lambda,
    lambda_with, le, lt, not, placeholder, sum_over, tuple_t, universe, var, windows,
};
use tess_ir::{BinderArena, ErrorCode, Kind, Node, VarId};
use tess_pass::Context;
use tess_types::TypeEnv;
use tessc::{compile, compile_batch, PipelineOptions};

fn options() -> PipelineOptions {
    PipelineOptions::default().with_validation(true)
}

fn ctx_with(vars: &[(u32, Node)]) -> Context {
    let mut env = TypeEnv::new();
    for (id, ty) in vars {
        env.bind(VarId::new(*id), ty.clone());
    }
    let mut ctx = Context::new();
    ctx.insert(env);
    ctx
}

fn x() -> Node {
    var(VarId::new(0), int_t())
}

#[test]
fn folds_and_canonicalizes_a_constraint() {
    tessc::init_tracing();
    let constraint = and([le(int(0), x()), lt(x(), add([int(2), int(3)]))]);
    let compiled = compile(&constraint, ctx_with(&[(0, int_t())]), &options()).unwrap();
    let text = compiled.root.to_string();
    assert!(text.contains("(lt $0 5)"), "{text}");
    assert!(text.contains("(le 0 $0)"), "{text}");

    let flipped = and([lt(x(), int(5)), le(int(0), x())]);
    let other = compile(&flipped, ctx_with(&[(0, int_t())]), &options()).unwrap();
    assert_eq!(other.root.key(), compiled.root.key());
}

#[test]
fn resolves_hoas_and_reduces_applications() {
    let mut arena = BinderArena::new();
    let double = lambda_with(&mut arena, int_t(), |_, n| add([n.clone(), n]));
    let constraint = eq(apply(double, int(4)), x());
    let compiled = compile(&constraint, ctx_with(&[(0, int_t())]), &options()).unwrap();
    assert_eq!(compiled.root.kind(), Kind::Eq);
    assert!(compiled.root.children().iter().any(|c| c.as_int() == Some(8)));
}

#[test]
fn quantifier_over_windows() {
    let mut arena = BinderArena::new();
    let d = windows(fin(int(6)), 3, 1);
    let pred = lambda_with(&mut arena, int_t(), |_, w| lt(w, add([int(2), int(2)])));
    let compiled = compile(&forall(d, pred), ctx_with(&[]), &options()).unwrap();

    let root = &compiled.root;
    assert_eq!(root.kind(), Kind::Forall);
    assert!(root.to_string().contains("(lt #0 4)"), "{root}");
    let domains = compiled.domains().unwrap();
    let derived = domains.derived(root.child(0)).unwrap();
    assert_eq!(derived.to_string(), "(fin 4)");
    assert!(compiled.types().unwrap().normalized(root).is_some());
}

#[test]
fn aggregates_over_a_product() {
    let grid = cart_prod([fin(int(3)), fin(int(3))]);
    let rows = dom_proj(grid.clone(), 0);
    let total = sum_over(rows, lambda(None, int_t(), bound(0, int_t())));
    let cells = count(grid, lambda(None, tuple_t([int_t(), int_t()]), eq(int(1), int(1))));
    let constraint = le(total, cells);
    let compiled = compile(&constraint, ctx_with(&[]), &options()).unwrap();
    assert_eq!(compiled.root.kind(), Kind::Le);
}

#[test]
fn unbound_placeholder_is_fatal() {
    let mut arena = BinderArena::new();
    let stray = placeholder(arena.fresh(), int_t());
    let err = compile(&add([stray, int(1)]), ctx_with(&[]), &options()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2001);
}

#[test]
fn type_errors_are_fatal() {
    // `and` over an int operand survives folding.
    let constraint = and([x(), lt(x(), int(3))]);
    let err = compile(&constraint, ctx_with(&[(0, int_t())]), &options()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2002);
}

#[test]
fn mistyped_bound_variable_is_fatal() {
    let constraint = forall(fin(int(3)), lambda(None, int_t(), not(bound(0, bool_t()))));
    let err = compile(&constraint, ctx_with(&[]), &options()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2002);
}

#[test]
fn domain_capability_errors_are_fatal() {
    let mut arena = BinderArena::new();
    let pred = lambda_with(&mut arena, int_t(), |_, w| lt(w, int(1)));
    let constraint = forall(windows(universe(int_t()), 2, 1), pred);
    let err = compile(&constraint, ctx_with(&[]), &options()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3001);
}

#[test]
fn type_check_needs_a_type_env() {
    let err = compile(&int(1), Context::new(), &options()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9003);

    let unchecked = options().with_type_check(false);
    compile(&int(1), Context::new(), &unchecked).unwrap();
}

#[test]
fn iteration_bound_applies_to_simplification() {
    let inc = lambda(None, int_t(), add([bound(0, int_t()), int(1)]));
    let term = eq(apply(inc, int(5)), x());

    let tight = options().with_max_iterations(1);
    let err = compile(&term, ctx_with(&[(0, int_t())]), &tight).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9004);

    let compiled = compile(&term, ctx_with(&[(0, int_t())]), &options()).unwrap();
    assert!(compiled.root.children().iter().any(|c| c.as_int() == Some(6)));
}

#[test]
fn batch_matches_sequential() {
    let terms: Vec<Node> = (0..8)
        .map(|i| and([le(int(i), x()), lt(x(), add([int(i), int(10)]))]))
        .collect();
    let jobs = terms
        .iter()
        .map(|t| (t.clone(), ctx_with(&[(0, int_t())])))
        .collect();

    let batch = compile_batch(jobs, &options());
    assert_eq!(batch.len(), terms.len());
    for (term, result) in terms.iter().zip(batch) {
        let sequential = compile(term, ctx_with(&[(0, int_t())]), &options()).unwrap();
        assert_eq!(result.unwrap().root.key(), sequential.root.key());
    }
}

#[test]
fn batch_reports_errors_per_job() {
    let jobs = vec![
        (lt(int(0), x()), ctx_with(&[(0, int_t())])),
        (lt(int(0), x()), ctx_with(&[(0, bool_t())])),
    ];
    let results = compile_batch(jobs, &options());
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().err().map(|e| e.code()), Some(ErrorCode::E2002));
}

proptest! {
    #[test]
    fn operand_order_never_changes_the_result(
        bounds in proptest::collection::vec(-20i64..20, 1..6),
        rotate in 0usize..6,
    ) {
        let conjuncts: Vec<Node> = bounds.iter().map(|b| le(int(*b), x())).collect();
        let mut rotated = conjuncts.clone();
        let len = rotated.len();
        rotated.rotate_left(rotate % len);

        let a = compile(&and(conjuncts), ctx_with(&[(0, int_t())]), &options()).unwrap();
        let b = compile(&and(rotated), ctx_with(&[(0, int_t())]), &options()).unwrap();
        prop_assert_eq!(a.root.key(), b.root.key());
    }
}
