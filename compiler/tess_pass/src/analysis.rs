//! Read-only analyses.
//!
//! An analysis computes one fact `F` per node, bottom-up, memoized by node
//! identity: a node's fact is a pure function of the node for a fixed
//! context. The per-node facts are then condensed by a `finish` function
//! into the fact the pass stores in the [`Context`].

use std::any::Any;

use rustc_hash::FxHashMap;
use tess_ir::{ensure_sufficient_stack, CompileError, Kind, Node, NodeAddr};

use crate::{Context, Dispatch, FactKind, Pass};

/// Handler computing the fact of one node.
pub type AnalyzeFn<F> = fn(&mut Analyzer<'_, F>, &Node) -> Result<F, CompileError>;

/// Per-node facts computed by one analysis run.
///
/// Entries keep their node alive, so addresses stay unique for the
/// lifetime of the table.
#[derive(Debug)]
pub struct NodeFacts<F> {
    facts: FxHashMap<NodeAddr, (Node, F)>,
}

impl<F> NodeFacts<F> {
    pub fn get(&self, node: &Node) -> Option<&F> {
        self.facts.get(&node.addr()).map(|(_, fact)| fact)
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.facts.contains_key(&node.addr())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, &F)> {
        self.facts.values().map(|(node, fact)| (node, fact))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl<F> Default for NodeFacts<F> {
    fn default() -> Self {
        NodeFacts {
            facts: FxHashMap::default(),
        }
    }
}

/// Traversal state of one analysis run.
pub struct Analyzer<'a, F> {
    ctx: &'a Context,
    dispatch: &'a Dispatch<AnalyzeFn<F>>,
    facts: NodeFacts<F>,
}

impl<'a, F: Clone + Default> Analyzer<'a, F> {
    pub fn new(ctx: &'a Context, dispatch: &'a Dispatch<AnalyzeFn<F>>) -> Self {
        Analyzer {
            ctx,
            dispatch,
            facts: NodeFacts::default(),
        }
    }

    #[inline]
    pub fn ctx(&self) -> &'a Context {
        self.ctx
    }

    /// The fact of `node`, computing it on first visit.
    ///
    /// Handlers may call this on nodes they synthesize; those are memoized
    /// like any other.
    pub fn visit(&mut self, node: &Node) -> Result<F, CompileError> {
        if let Some(fact) = self.facts.get(node) {
            return Ok(fact.clone());
        }
        let fact = ensure_sufficient_stack(|| match self.dispatch.get(node.kind()) {
            Some(handler) => handler(self, node),
            None => self.visit_default(node),
        })?;
        if self
            .facts
            .facts
            .insert(node.addr(), (node.clone(), fact.clone()))
            .is_some()
        {
            return Err(CompileError::internal(
                format!("analysis memo already holds a fact for {node}"),
                [node.clone()],
            ));
        }
        Ok(fact)
    }

    /// Default fallback: visit the type and children, yield `F::default()`.
    pub fn visit_default(&mut self, node: &Node) -> Result<F, CompileError> {
        self.visit_children(node)?;
        Ok(F::default())
    }

    /// Visit the type and every child of `node`.
    pub fn visit_children(&mut self, node: &Node) -> Result<(), CompileError> {
        if let Some(ty) = node.ty() {
            self.visit(ty)?;
        }
        for child in node.children() {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Fact of an already visited node.
    pub fn fact(&self, node: &Node) -> Option<&F> {
        self.facts.get(node)
    }

    pub fn into_facts(self) -> NodeFacts<F> {
        self.facts
    }
}

/// A dispatch-table analysis producing one `Out` fact.
pub struct AnalysisPass<F, Out> {
    name: &'static str,
    requires: Vec<FactKind>,
    dispatch: Dispatch<AnalyzeFn<F>>,
    finish: fn(&Node, NodeFacts<F>) -> Out,
}

impl<F: Clone + Default, Out: Any + Send + Sync> AnalysisPass<F, Out> {
    pub fn builder(name: &'static str, finish: fn(&Node, NodeFacts<F>) -> Out) -> AnalysisPassBuilder<F, Out> {
        AnalysisPassBuilder {
            pass: AnalysisPass {
                name,
                requires: Vec::new(),
                dispatch: Dispatch::new(),
                finish,
            },
        }
    }

    /// Run the analysis and return its fact without touching the context.
    #[tracing::instrument(level = "debug", skip_all, fields(pass = self.name))]
    pub fn analyze(&self, root: &Node, ctx: &Context) -> Result<Out, CompileError> {
        let mut analyzer = Analyzer::new(ctx, &self.dispatch);
        analyzer.visit(root)?;
        let facts = analyzer.into_facts();
        tracing::debug!(nodes = facts.len(), "analysis complete");
        Ok((self.finish)(root, facts))
    }
}

impl<F: Clone + Default, Out: Any + Send + Sync> Pass for AnalysisPass<F, Out> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires(&self) -> Vec<FactKind> {
        self.requires.clone()
    }

    fn produces(&self) -> Vec<FactKind> {
        vec![FactKind::of::<Out>()]
    }

    fn run(&mut self, root: &Node, ctx: &mut Context) -> Result<Node, CompileError> {
        let out = self.analyze(root, ctx)?;
        ctx.insert(out);
        Ok(root.clone())
    }
}

/// Builder for [`AnalysisPass`].
pub struct AnalysisPassBuilder<F, Out> {
    pass: AnalysisPass<F, Out>,
}

impl<F: Clone + Default, Out> AnalysisPassBuilder<F, Out> {
    #[must_use]
    pub fn requires<T: Any>(mut self) -> Self {
        self.pass.requires.push(FactKind::of::<T>());
        self
    }

    #[must_use]
    pub fn handle(mut self, kind: Kind, handler: AnalyzeFn<F>) -> Self {
        self.pass.dispatch.register(kind, handler);
        self
    }

    pub fn build(self) -> AnalysisPass<F, Out> {
        self.pass
    }
}

#[cfg(test)]
mod tests;
