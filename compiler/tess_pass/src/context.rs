//! The typed fact context threaded through a pipeline run.

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;
use tess_ir::CompileError;

use crate::FactKind;

type BoxedFact = Box<dyn Any + Send + Sync>;

/// Heterogeneous map holding one fact per [`FactKind`].
///
/// Carries injected environments (symbol tables, type and role
/// environments) into a pipeline and analysis results between passes,
/// with no global state.
#[derive(Default)]
pub struct Context {
    facts: FxHashMap<TypeId, (FactKind, BoxedFact)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fact whose kind is not yet present.
    ///
    /// Adding a kind twice is an [`InternalConsistency`] error: one fact
    /// per kind per run.
    ///
    /// [`InternalConsistency`]: CompileError::InternalConsistency
    pub fn add<T: Any + Send + Sync>(&mut self, fact: T) -> Result<(), CompileError> {
        let kind = FactKind::of::<T>();
        if self.facts.contains_key(&kind.id()) {
            return Err(CompileError::internal(
                format!("context already holds a `{kind}` fact"),
                [],
            ));
        }
        self.facts.insert(kind.id(), (kind, Box::new(fact)));
        Ok(())
    }

    /// Insert or replace a fact, returning the previous one.
    ///
    /// Used by analyses re-run in fixed-point mode.
    pub fn insert<T: Any + Send + Sync>(&mut self, fact: T) -> Option<T> {
        let kind = FactKind::of::<T>();
        let previous = self.facts.insert(kind.id(), (kind, Box::new(fact)))?;
        previous.1.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// The fact of kind `T`, or [`MissingDependency`] if absent.
    ///
    /// [`MissingDependency`]: CompileError::MissingDependency
    pub fn get<T: Any>(&self) -> Result<&T, CompileError> {
        self.try_get::<T>().ok_or_else(|| CompileError::MissingDependency {
            pass: "context",
            fact: FactKind::of::<T>().name(),
        })
    }

    pub fn try_get<T: Any>(&self) -> Option<&T> {
        self.facts
            .get(&TypeId::of::<T>())
            .and_then(|(_, fact)| fact.downcast_ref::<T>())
    }

    pub fn contains(&self, kind: FactKind) -> bool {
        self.facts.contains_key(&kind.id())
    }

    pub fn remove<T: Any>(&mut self) -> Option<T> {
        let (_, fact) = self.facts.remove(&TypeId::of::<T>())?;
        fact.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Kinds currently present, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = FactKind> + '_ {
        self.facts.values().map(|(kind, _)| *kind)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests;
