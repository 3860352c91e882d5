use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tess_ir::construct::int;
use tess_ir::{ErrorCode, Kind};

use super::*;
use crate::{Rewriter, TransformPass};

struct TypeEnvStandIn;

/// Records whether `run` was reached.
struct Probe {
    runs: Arc<AtomicUsize>,
}

impl Pass for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn requires(&self) -> Vec<FactKind> {
        vec![FactKind::of::<TypeEnvStandIn>()]
    }

    fn run(&mut self, root: &Node, _: &mut Context) -> Result<Node, CompileError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(root.clone())
    }
}

/// Declares a fact it never produces.
struct Liar;

impl Pass for Liar {
    fn name(&self) -> &'static str {
        "liar"
    }

    fn produces(&self) -> Vec<FactKind> {
        vec![FactKind::of::<TypeEnvStandIn>()]
    }

    fn run(&mut self, root: &Node, _: &mut Context) -> Result<Node, CompileError> {
        Ok(root.clone())
    }
}

fn decrement(_: &mut Rewriter<'_>, node: &Node) -> Result<Node, CompileError> {
    match node.as_int() {
        Some(n) if n > 0 => Ok(int(n - 1)),
        _ => Ok(node.clone()),
    }
}

fn increment(_: &mut Rewriter<'_>, node: &Node) -> Result<Node, CompileError> {
    Ok(int(node.as_int().unwrap_or_default() + 1))
}

#[test]
fn missing_dependency_is_raised_before_run() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut manager = PassManager::new().with(Probe { runs: runs.clone() });
    let err = manager.run(&int(1), &mut Context::new(), false).unwrap_err();

    assert_eq!(err.code(), ErrorCode::E9003);
    assert!(matches!(
        err,
        CompileError::MissingDependency { pass: "probe", fact: "TypeEnvStandIn" }
    ));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn satisfied_dependency_runs_the_pass() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut manager = PassManager::new().with(Probe { runs: runs.clone() });
    let mut ctx = Context::new();
    ctx.add(TypeEnvStandIn).unwrap();
    manager.run(&int(1), &mut ctx, false).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn undelivered_fact_is_internal_error() {
    let mut manager = PassManager::new().with(Liar);
    let err = manager.run(&int(1), &mut Context::new(), false).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9002);
}

#[test]
fn passes_run_in_order() {
    let bump = TransformPass::builder("bump").handle(Kind::Lit, increment).build();
    let down = TransformPass::builder("down").handle(Kind::Lit, decrement).build();
    let mut manager = PassManager::new().with(bump).with(down);
    assert_eq!(manager.names().collect::<Vec<_>>(), vec!["bump", "down"]);
    let result = manager.run(&int(0), &mut Context::new(), false).unwrap();
    assert_eq!(result.as_int(), Some(0));
}

#[test]
fn fixed_point_converges_within_bound() {
    // 1 -> 0 in the first iteration, unchanged in the second.
    let pass = TransformPass::builder("decrement").handle(Kind::Lit, decrement).build();
    let mut manager = PassManager::new().with(pass).with_max_iterations(2);
    let result = manager.run(&int(1), &mut Context::new(), true).unwrap();
    assert_eq!(result.as_int(), Some(0));
}

#[test]
fn fixed_point_bound_too_small_fails() {
    let pass = TransformPass::builder("decrement").handle(Kind::Lit, decrement).build();
    let mut manager = PassManager::new().with(pass).with_max_iterations(1);
    let err = manager.run(&int(1), &mut Context::new(), true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E9004);
}

#[test]
fn non_converging_pair_raises_non_convergence() {
    let up = TransformPass::builder("up").handle(Kind::Lit, increment).build();
    let up_again = TransformPass::builder("up-again").handle(Kind::Lit, increment).build();
    let mut manager = PassManager::new().with(up).with(up_again).with_max_iterations(5);
    let err = manager.run(&int(0), &mut Context::new(), true).unwrap_err();
    match err {
        CompileError::NonConvergence { iterations, last } => {
            assert_eq!(iterations, 5);
            assert_eq!(last.as_int(), Some(10));
        }
        other => panic!("expected non-convergence, got {other}"),
    }
}
