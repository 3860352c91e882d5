//! Fact kinds: the keys of a [`Context`](crate::Context).

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of a fact, identified by its Rust type.
///
/// Compared and hashed by type identity; the name is for diagnostics.
#[derive(Copy, Clone)]
pub struct FactKind {
    id: TypeId,
    name: &'static str,
}

impl FactKind {
    pub fn of<T: Any>() -> Self {
        let full = type_name::<T>();
        // Diagnostics name the type, not its module path or parameters.
        let base = full.split('<').next().unwrap_or(full);
        let name = base.rsplit("::").next().unwrap_or(base);
        FactKind {
            id: TypeId::of::<T>(),
            name,
        }
    }

    #[inline]
    pub fn id(self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for FactKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FactKind {}

impl Hash for FactKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactKind({})", self.name)
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
