//! Per-constructor handler tables.

use rustc_hash::FxHashMap;
use tess_ir::Kind;

/// Maps node constructors to handlers.
///
/// Built once when a pass is defined, from an explicit list of
/// `(kind, handler)` pairs; there is no ambient registry. Kinds without an
/// entry use the pass's default fallback.
#[derive(Clone)]
pub struct Dispatch<H> {
    handlers: FxHashMap<Kind, H>,
}

impl<H: Copy> Dispatch<H> {
    pub fn new() -> Self {
        Dispatch {
            handlers: FxHashMap::default(),
        }
    }

    /// Register `handler` for `kind`.
    ///
    /// # Panics
    /// Panics if `kind` already has a handler: two handlers for one
    /// constructor is a bug in the pass definition.
    pub fn register(&mut self, kind: Kind, handler: H) {
        if self.handlers.insert(kind, handler).is_some() {
            panic!("handler for `{kind}` registered twice");
        }
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, kind: Kind, handler: H) -> Self {
        self.register(kind, handler);
        self
    }

    #[inline]
    pub fn get(&self, kind: Kind) -> Option<H> {
        self.handlers.get(&kind).copied()
    }

    pub fn handles(&self, kind: Kind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H: Copy> Default for Dispatch<H> {
    fn default() -> Self {
        Self::new()
    }
}
