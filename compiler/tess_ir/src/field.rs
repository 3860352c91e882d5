//! Non-child scalar fields of a node.

use std::fmt;
use std::sync::Arc;

use crate::{BinderId, Name};

/// Identifier of a free symbolic variable.
///
/// Issued by the external symbol table; the core only compares them.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        VarId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Literal constant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Unit,
    Bool(bool),
    Int(i64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Unit => f.write_str("()"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
        }
    }
}

/// Field payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Field {
    Literal(Literal),
    Label(Name),
    Labels(Arc<[Name]>),
    Var(VarId),
    /// `Some` for HOAS binders and placeholders, `None` for de Bruijn binders.
    Binder(Option<BinderId>),
    Index(u32),
    Int(i64),
}

/// Field kind, used to validate a node's fields against its signature.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FieldKind {
    Literal,
    Label,
    Labels,
    Var,
    Binder,
    Index,
    Int,
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Literal(_) => FieldKind::Literal,
            Field::Label(_) => FieldKind::Label,
            Field::Labels(_) => FieldKind::Labels,
            Field::Var(_) => FieldKind::Var,
            Field::Binder(_) => FieldKind::Binder,
            Field::Index(_) => FieldKind::Index,
            Field::Int(_) => FieldKind::Int,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Literal(lit) => write!(f, "{lit}"),
            Field::Label(name) => write!(f, "{name}"),
            Field::Labels(names) => {
                f.write_str("{")?;
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{name}")?;
                }
                f.write_str("}")
            }
            Field::Var(id) => write!(f, "{id}"),
            Field::Binder(Some(id)) => write!(f, "{id}"),
            Field::Binder(None) => f.write_str("_"),
            Field::Index(i) => write!(f, "{i}"),
            Field::Int(n) => write!(f, "{n}"),
        }
    }
}
