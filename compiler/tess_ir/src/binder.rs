//! HOAS binder handles.
//!
//! A HOAS binder is identified by a small integer handle allocated from a
//! [`BinderArena`]. "Same placeholder" means "same handle"; nothing relies
//! on pointer identity. Handles are only meaningful within the arena (and
//! therefore the builder session) that issued them.

use std::fmt;

use crate::Name;

/// Handle of a HOAS binder placeholder.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct BinderId(u32);

impl BinderId {
    /// Create from a raw handle value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        BinderId(raw)
    }

    /// Get the raw handle value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BinderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinderId({})", self.0)
    }
}

impl fmt::Display for BinderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// Allocator for binder handles.
///
/// Records an optional name hint per binder for diagnostics.
#[derive(Default, Debug)]
pub struct BinderArena {
    hints: Vec<Option<Name>>,
}

impl BinderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, anonymous binder handle.
    pub fn fresh(&mut self) -> BinderId {
        self.push(None)
    }

    /// Allocate a fresh binder handle with a name hint.
    pub fn fresh_named(&mut self, hint: Name) -> BinderId {
        self.push(Some(hint))
    }

    /// Name hint recorded for `id`, if any.
    pub fn hint(&self, id: BinderId) -> Option<Name> {
        self.hints.get(id.0 as usize).copied().flatten()
    }

    /// Number of handles issued so far.
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    fn push(&mut self, hint: Option<Name>) -> BinderId {
        let raw = u32::try_from(self.hints.len())
            .unwrap_or_else(|_| panic!("binder arena exceeded u32::MAX handles"));
        self.hints.push(hint);
        BinderId(raw)
    }
}
