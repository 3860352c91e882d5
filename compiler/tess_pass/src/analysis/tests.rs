use pretty_assertions::assert_eq;
use tess_ir::construct::{add, eq, int, mul, not};

use super::*;

#[derive(Debug, PartialEq)]
struct Total(i64);

struct Scale(i64);

fn lit(_: &mut Analyzer<'_, i64>, node: &Node) -> Result<i64, CompileError> {
    Ok(node.as_int().unwrap_or_default())
}

fn scaled_lit(an: &mut Analyzer<'_, i64>, node: &Node) -> Result<i64, CompileError> {
    let scale = an.ctx().get::<Scale>()?.0;
    Ok(node.as_int().unwrap_or_default() * scale)
}

fn sum(an: &mut Analyzer<'_, i64>, node: &Node) -> Result<i64, CompileError> {
    node.children().iter().map(|c| an.visit(c)).sum()
}

fn product(an: &mut Analyzer<'_, i64>, node: &Node) -> Result<i64, CompileError> {
    node.children().iter().map(|c| an.visit(c)).product()
}

fn total(root: &Node, facts: NodeFacts<i64>) -> Total {
    Total(facts.get(root).copied().unwrap_or_default())
}

fn evaluator() -> AnalysisPass<i64, Total> {
    AnalysisPass::builder("evaluate", total)
        .handle(Kind::Lit, lit)
        .handle(Kind::Add, sum)
        .handle(Kind::Mul, product)
        .build()
}

#[test]
fn handlers_compute_bottom_up() {
    let root = add([int(1), mul([int(2), int(3)])]);
    let out = evaluator().analyze(&root, &Context::new()).unwrap();
    assert_eq!(out, Total(7));
}

#[test]
fn shared_subtrees_are_visited_once() {
    let shared = mul([int(2), int(3)]);
    let root = add([shared.clone(), shared.clone()]);
    let ctx = Context::new();
    let pass = evaluator();
    let mut analyzer = Analyzer::new(&ctx, &pass.dispatch);
    assert_eq!(analyzer.visit(&root).unwrap(), 12);
    assert_eq!(analyzer.fact(&shared), Some(&6));
    let facts = analyzer.into_facts();
    assert_eq!(facts.iter().filter(|(node, _)| Node::ptr_eq(node, &shared)).count(), 1);
}

#[test]
fn default_fallback_recurses_into_children() {
    let one = int(1);
    let root = not(eq(one.clone(), int(2)));
    let ctx = Context::new();
    let pass = evaluator();
    let mut analyzer = Analyzer::new(&ctx, &pass.dispatch);
    assert_eq!(analyzer.visit(&root).unwrap(), 0);
    assert_eq!(analyzer.fact(&one), Some(&1));
}

#[test]
fn run_stores_the_fact_in_the_context() {
    let root = add([int(4), int(5)]);
    let mut ctx = Context::new();
    let mut pass = evaluator();
    let returned = pass.run(&root, &mut ctx).unwrap();
    assert!(Node::ptr_eq(&returned, &root));
    assert_eq!(ctx.get::<Total>().unwrap(), &Total(9));
    assert_eq!(pass.produces(), vec![FactKind::of::<Total>()]);
}

#[test]
fn handlers_read_the_context() {
    let pass = AnalysisPass::builder("scaled", total)
        .requires::<Scale>()
        .handle(Kind::Lit, scaled_lit)
        .handle(Kind::Add, sum)
        .build();
    assert_eq!(pass.requires(), vec![FactKind::of::<Scale>()]);

    let mut ctx = Context::new();
    ctx.add(Scale(10)).unwrap();
    let out = pass.analyze(&add([int(1), int(2)]), &ctx).unwrap();
    assert_eq!(out, Total(30));
}
