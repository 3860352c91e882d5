//! Injected environment facts.
//!
//! The embedding that builds a term knows its symbolic variables; it
//! describes them through these tables and adds them to the pass
//! [`Context`](tess_pass::Context) before compilation. All three are keyed
//! by [`VarId`].

use rustc_hash::FxHashMap;
use tess_ir::{Name, Node, VarId};

/// How a variable takes part in the constraint problem.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Role {
    /// Fixed by the puzzle instance.
    Given,
    /// Chosen by the solver.
    Unknown,
    /// Introduced by a helper to name an intermediate value.
    Auxiliary,
}

/// Whether a variable appears in the solution reported to the user.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Symbol {
    pub name: Name,
    pub role: Role,
    pub visibility: Visibility,
}

/// Names, roles and visibility of the symbolic variables.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<VarId, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `var`, returning the previous declaration if any.
    pub fn declare(&mut self, var: VarId, symbol: Symbol) -> Option<Symbol> {
        self.symbols.insert(var, symbol)
    }

    pub fn get(&self, var: VarId) -> Option<&Symbol> {
        self.symbols.get(&var)
    }

    /// Variables with [`Visibility::Public`], in id order.
    pub fn public(&self) -> Vec<VarId> {
        let mut vars: Vec<VarId> = self
            .symbols
            .iter()
            .filter(|(_, symbol)| symbol.visibility == Visibility::Public)
            .map(|(var, _)| *var)
            .collect();
        vars.sort_unstable();
        vars
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Declared type of every symbolic variable.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    types: FxHashMap<VarId, Node>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `var` to `ty`.
    ///
    /// # Panics
    /// Panics if `ty` is not a type.
    pub fn bind(&mut self, var: VarId, ty: Node) {
        assert!(ty.is_type(), "variable {var} bound to the value {ty}");
        self.types.insert(var, ty);
    }

    /// Builder-style [`bind`](Self::bind).
    #[must_use]
    pub fn with(mut self, var: VarId, ty: Node) -> Self {
        self.bind(var, ty);
        self
    }

    pub fn lookup(&self, var: VarId) -> Option<&Node> {
        self.types.get(&var)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Role of every symbolic variable, for categorizing constraints.
#[derive(Clone, Debug, Default)]
pub struct RoleEnv {
    roles: FxHashMap<VarId, Role>,
}

impl RoleEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, var: VarId, role: Role) {
        self.roles.insert(var, role);
    }

    pub fn role(&self, var: VarId) -> Option<Role> {
        self.roles.get(&var).copied()
    }

    /// Variables with `role`, in id order.
    pub fn with_role(&self, role: Role) -> Vec<VarId> {
        let mut vars: Vec<VarId> = self
            .roles
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(var, _)| *var)
            .collect();
        vars.sort_unstable();
        vars
    }
}

impl From<&SymbolTable> for RoleEnv {
    fn from(symbols: &SymbolTable) -> Self {
        RoleEnv {
            roles: symbols.symbols.iter().map(|(var, symbol)| (*var, symbol.role)).collect(),
        }
    }
}
