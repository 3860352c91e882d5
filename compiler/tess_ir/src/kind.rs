//! Node constructors and their static signatures.
//!
//! `Kind` is the closed set of constructors. Everything a generic traversal
//! needs to know about a constructor (arity, field signature, which children
//! are types, which child sits under a binder, canonical priority) is
//! answered here, so passes never special-case shapes they do not rewrite.

use std::fmt;

use crate::field::FieldKind;

/// Node constructor tag.
///
/// Types come first (`UnitT` .. `ApplyT`), values after.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
pub enum Kind {
    // === Types ===
    UnitT,
    BoolT,
    IntT,
    /// Enumeration type. Fields: name, labels.
    EnumT,
    TupleT,
    SumT,
    /// Domain type. Children: carrier type, optional cardinality value.
    DomT,
    /// Dependent function type. Children: parameter type, body type (under the binder).
    PiT,
    /// Residual type-level application. Children: function type, argument value.
    ApplyT,

    // === Leaves ===
    Lit,
    EnumLit,
    /// Free symbolic variable (puzzle unknown or parameter).
    Var,
    /// HOAS use of a binder placeholder.
    Placeholder,
    /// De Bruijn use of an enclosing binder.
    BoundVar,

    // === Functions ===
    /// Children: parameter type, body (under the binder).
    Lambda,
    Apply,

    // === Logic ===
    Not,
    And,
    Or,
    Implies,

    // === Arithmetic ===
    Add,
    Mul,
    Sub,
    Neg,
    Div,
    Mod,

    // === Comparison ===
    Eq,
    Lt,
    Le,
    Ite,

    // === Algebraic data ===
    TupleVal,
    Proj,
    Inj,
    /// Children: scrutinee, one arm (a `Lambda`) per sum component.
    Match,

    // === Domains ===
    Fin,
    Universe,
    CartProd,
    DisjUnion,
    Restrict,
    DomProj,
    Slice,
    Windows,
    Tiles,

    // === Quantifiers ===
    Forall,
    Exists,

    // === Collections ===
    SumOver,
    Count,
    Card,
}

/// Number of children a constructor accepts.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Between(lo, hi) => lo <= n && n <= hi,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "exactly {k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

/// Whether a child position holds a type or a value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Sort {
    Type,
    Value,
}

impl Kind {
    /// Is this a type constructor?
    #[inline]
    pub const fn is_type(self) -> bool {
        (self as u8) <= (Kind::ApplyT as u8)
    }

    /// Is this a binder (`Lambda` or `PiT`)?
    #[inline]
    pub const fn is_binder(self) -> bool {
        matches!(self, Kind::Lambda | Kind::PiT)
    }

    /// Index of the child that sits under this constructor's binder.
    #[inline]
    pub const fn binder_child(self) -> Option<usize> {
        if self.is_binder() {
            Some(1)
        } else {
            None
        }
    }

    /// Associative-commutative operators, flattened and sorted by CSE.
    #[inline]
    pub const fn is_ac(self) -> bool {
        matches!(self, Kind::And | Kind::Or | Kind::Add | Kind::Mul)
    }

    /// Domain constructors.
    #[inline]
    pub const fn is_domain(self) -> bool {
        matches!(
            self,
            Kind::Fin
                | Kind::Universe
                | Kind::CartProd
                | Kind::DisjUnion
                | Kind::Restrict
                | Kind::DomProj
                | Kind::Slice
                | Kind::Windows
                | Kind::Tiles
        )
    }

    /// Domain constructors that manufacture a derived `Fin` index domain.
    #[inline]
    pub const fn is_derived_domain(self) -> bool {
        matches!(self, Kind::Slice | Kind::Windows | Kind::Tiles)
    }

    pub const fn arity(self) -> Arity {
        match self {
            Kind::UnitT
            | Kind::BoolT
            | Kind::IntT
            | Kind::EnumT
            | Kind::Lit
            | Kind::EnumLit
            | Kind::Var
            | Kind::Placeholder
            | Kind::BoundVar => Arity::Exact(0),

            Kind::Not
            | Kind::Neg
            | Kind::Proj
            | Kind::Inj
            | Kind::Fin
            | Kind::Universe
            | Kind::DomProj
            | Kind::Slice
            | Kind::Windows
            | Kind::Tiles
            | Kind::Card => Arity::Exact(1),

            Kind::PiT
            | Kind::ApplyT
            | Kind::Lambda
            | Kind::Apply
            | Kind::Implies
            | Kind::Sub
            | Kind::Div
            | Kind::Mod
            | Kind::Eq
            | Kind::Lt
            | Kind::Le
            | Kind::Restrict
            | Kind::Forall
            | Kind::Exists
            | Kind::SumOver
            | Kind::Count => Arity::Exact(2),

            Kind::Ite => Arity::Exact(3),

            Kind::TupleT | Kind::TupleVal | Kind::And | Kind::Or | Kind::Add | Kind::Mul => {
                Arity::AtLeast(0)
            }
            Kind::SumT | Kind::CartProd | Kind::DisjUnion => Arity::AtLeast(1),
            Kind::Match => Arity::AtLeast(2),
            Kind::DomT => Arity::Between(1, 2),
        }
    }

    /// Expected field kinds, in order.
    pub const fn field_signature(self) -> &'static [FieldKind] {
        match self {
            Kind::EnumT => &[FieldKind::Label, FieldKind::Labels],
            Kind::PiT | Kind::Lambda | Kind::Placeholder => &[FieldKind::Binder],
            Kind::Lit => &[FieldKind::Literal],
            Kind::EnumLit => &[FieldKind::Label],
            Kind::Var => &[FieldKind::Var],
            Kind::BoundVar | Kind::Proj | Kind::Inj | Kind::DomProj => &[FieldKind::Index],
            Kind::Slice | Kind::Windows => &[FieldKind::Int, FieldKind::Int],
            Kind::Tiles => &[FieldKind::Int],
            _ => &[],
        }
    }

    /// Sort of the child at position `index`.
    pub const fn child_sort(self, index: usize) -> Sort {
        match self {
            Kind::TupleT | Kind::SumT | Kind::PiT | Kind::Universe => Sort::Type,
            Kind::DomT | Kind::ApplyT | Kind::Lambda => {
                if index == 0 {
                    Sort::Type
                } else {
                    Sort::Value
                }
            }
            _ => Sort::Value,
        }
    }

    /// Priority used to order operands of AC operators.
    ///
    /// Any deterministic total order works; this one puts cheap leaves first
    /// so sorted operand lists read "constants, then variables, then
    /// compound terms".
    pub const fn priority(self) -> u8 {
        match self {
            Kind::Lit => 0,
            Kind::EnumLit => 1,
            Kind::Var => 2,
            Kind::BoundVar => 3,
            Kind::Placeholder => 4,
            Kind::Proj | Kind::Inj => 5,
            Kind::Apply => 6,
            Kind::Neg | Kind::Not => 7,
            Kind::Add | Kind::Mul | Kind::Sub | Kind::Div | Kind::Mod => 8,
            Kind::Eq | Kind::Lt | Kind::Le => 9,
            Kind::And | Kind::Or | Kind::Implies => 10,
            Kind::Ite | Kind::Match | Kind::TupleVal => 11,
            Kind::Card | Kind::Count | Kind::SumOver => 12,
            Kind::Forall | Kind::Exists => 13,
            Kind::Lambda => 14,
            Kind::Fin
            | Kind::Universe
            | Kind::CartProd
            | Kind::DisjUnion
            | Kind::Restrict
            | Kind::DomProj
            | Kind::Slice
            | Kind::Windows
            | Kind::Tiles => 15,
            Kind::UnitT
            | Kind::BoolT
            | Kind::IntT
            | Kind::EnumT
            | Kind::TupleT
            | Kind::SumT
            | Kind::DomT
            | Kind::PiT
            | Kind::ApplyT => 16,
        }
    }

    /// Lower-case constructor name used in diagnostics and debug output.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::UnitT => "unit",
            Kind::BoolT => "bool",
            Kind::IntT => "int",
            Kind::EnumT => "enum",
            Kind::TupleT => "tuple-type",
            Kind::SumT => "sum-type",
            Kind::DomT => "domain-type",
            Kind::PiT => "pi",
            Kind::ApplyT => "apply-type",
            Kind::Lit => "lit",
            Kind::EnumLit => "enum-lit",
            Kind::Var => "var",
            Kind::Placeholder => "placeholder",
            Kind::BoundVar => "bound",
            Kind::Lambda => "lambda",
            Kind::Apply => "apply",
            Kind::Not => "not",
            Kind::And => "and",
            Kind::Or => "or",
            Kind::Implies => "implies",
            Kind::Add => "add",
            Kind::Mul => "mul",
            Kind::Sub => "sub",
            Kind::Neg => "neg",
            Kind::Div => "div",
            Kind::Mod => "mod",
            Kind::Eq => "eq",
            Kind::Lt => "lt",
            Kind::Le => "le",
            Kind::Ite => "ite",
            Kind::TupleVal => "tuple",
            Kind::Proj => "proj",
            Kind::Inj => "inj",
            Kind::Match => "match",
            Kind::Fin => "fin",
            Kind::Universe => "universe",
            Kind::CartProd => "cart-prod",
            Kind::DisjUnion => "disj-union",
            Kind::Restrict => "restrict",
            Kind::DomProj => "dom-proj",
            Kind::Slice => "slice",
            Kind::Windows => "windows",
            Kind::Tiles => "tiles",
            Kind::Forall => "forall",
            Kind::Exists => "exists",
            Kind::SumOver => "sum-over",
            Kind::Count => "count",
            Kind::Card => "card",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
