//! The compilation pipeline.

use rayon::prelude::*;
use tess_bind::{ensure_resolved, resolve_bindings};
use tess_canon::{cse, validate, BetaSimplify, ConstFold, CsePass};
use tess_domain::{DomainFacts, DomainInference};
use tess_ir::{CompileError, Node};
use tess_pass::{Context, PassManager};
use tess_types::{TypeCheck, TypeFacts};

use crate::PipelineOptions;

/// Result of one compilation: the canonical root and the context holding
/// the injected facts plus every fact the analyses produced.
pub struct Compiled {
    pub root: Node,
    pub ctx: Context,
}

impl std::fmt::Debug for Compiled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiled")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl Compiled {
    /// Type facts, if the type checker ran.
    pub fn types(&self) -> Option<&TypeFacts> {
        self.ctx.try_get::<TypeFacts>()
    }

    /// Domain facts, if domain inference ran.
    pub fn domains(&self) -> Option<&DomainFacts> {
        self.ctx.try_get::<DomainFacts>()
    }
}

/// Compile one term.
///
/// `ctx` carries the injected facts (`TypeEnv` is required when
/// [`PipelineOptions::check_types`] is set).
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile(root: &Node, mut ctx: Context, options: &PipelineOptions) -> Result<Compiled, CompileError> {
    let resolved = resolve_bindings(root)?;
    ensure_resolved(&resolved)?;
    let canonical = cse(&resolved)?;

    let mut simplify = PassManager::new()
        .with_max_iterations(options.max_iterations)
        .with(BetaSimplify::pass())
        .with(ConstFold::pass())
        .with(CsePass::new());
    let simplified = simplify.run(&canonical, &mut ctx, true)?;

    let mut analyses = PassManager::new();
    if options.check_types {
        analyses.push(Box::new(TypeCheck::pass()));
    }
    if options.infer_domains {
        analyses.push(Box::new(DomainInference::pass()));
    }
    let root = analyses.run(&simplified, &mut ctx, false)?;

    if options.validate {
        validate(&root)?;
    }
    tracing::debug!(root = %root, "compiled");
    Ok(Compiled { root, ctx })
}

/// Compile independent terms on the rayon pool.
///
/// Each job has its own context and CSE tables, so results are exactly
/// those of compiling the jobs one by one, in input order.
pub fn compile_batch(jobs: Vec<(Node, Context)>, options: &PipelineOptions) -> Vec<Result<Compiled, CompileError>> {
    tracing::debug!(jobs = jobs.len(), "batch compile");
    jobs.into_par_iter()
        .map(|(root, ctx)| compile(&root, ctx, options))
        .collect()
}
