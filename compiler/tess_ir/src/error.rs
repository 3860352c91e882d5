//! Compilation errors.
//!
//! Every error is fatal: the compiler never catches, retries or degrades.
//! Each variant carries the offending node(s) so the diagnostic names the
//! violated contract precisely.

use std::fmt;

use crate::{BinderId, Kind, Node};

/// Error codes for compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E2xxx: Binding and typing errors
/// - E3xxx: Domain errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Placeholder used outside every open binder
    E2001,
    /// Operand type violates the operator's signature
    E2002,
    /// Domain lacks a capability an operator requires
    E3001,
    /// Malformed node construction
    E9001,
    /// Internal consistency violation
    E9002,
    /// Pass scheduled without a required fact
    E9003,
    /// Fixed-point iteration did not converge
    E9004,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
            ErrorCode::E9003 => "E9003",
            ErrorCode::E9004 => "E9004",
        }
    }

    /// Internal errors indicate a compiler bug rather than a bad input term.
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            ErrorCode::E9001 | ErrorCode::E9002 | ErrorCode::E9003 | ErrorCode::E9004
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain capability an operator can require.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Capability {
    Finite,
    Ordered,
    /// A decomposition witness with a component at this index.
    Component(u32),
    /// At least this many elements.
    MinLength(i64),
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Finite => f.write_str("finite"),
            Capability::Ordered => f.write_str("ordered"),
            Capability::Component(i) => write!(f, "decomposed with a component #{i}"),
            Capability::MinLength(n) => write!(f, "at least {n} elements long"),
        }
    }
}

/// Fatal compilation error.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CompileError {
    /// Wrong arity, field kind or type presence at construction.
    #[error("malformed `{kind}` node: {reason}")]
    Malformed { kind: Kind, reason: String },

    #[error("unbound variable: placeholder {binder} used outside its binder in {node}")]
    UnboundVariable { binder: BinderId, node: Node },

    #[error("internal consistency violation: {message}")]
    InternalConsistency { message: String, nodes: Vec<Node> },

    #[error("type mismatch at {node}: expected {expected}, found `{found}`")]
    TypeMismatch {
        node: Node,
        expected: String,
        found: Node,
    },

    #[error("`{op}` requires its domain to be {required}, but {domain} is not")]
    DomainCapability {
        op: Kind,
        required: Capability,
        domain: Node,
    },

    #[error("pass `{pass}` requires fact `{fact}`, which is not in the context")]
    MissingDependency {
        pass: &'static str,
        fact: &'static str,
    },

    #[error("fixed-point iteration did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize, last: Node },
}

impl CompileError {
    /// Shorthand for an [`InternalConsistency`](Self::InternalConsistency) error.
    pub fn internal(message: impl Into<String>, nodes: impl IntoIterator<Item = Node>) -> Self {
        CompileError::InternalConsistency {
            message: message.into(),
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Shorthand for a [`TypeMismatch`](Self::TypeMismatch) error.
    pub fn type_mismatch(node: &Node, expected: impl Into<String>, found: &Node) -> Self {
        CompileError::TypeMismatch {
            node: node.clone(),
            expected: expected.into(),
            found: found.clone(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Malformed { .. } => ErrorCode::E9001,
            CompileError::UnboundVariable { .. } => ErrorCode::E2001,
            CompileError::InternalConsistency { .. } => ErrorCode::E9002,
            CompileError::TypeMismatch { .. } => ErrorCode::E2002,
            CompileError::DomainCapability { .. } => ErrorCode::E3001,
            CompileError::MissingDependency { .. } => ErrorCode::E9003,
            CompileError::NonConvergence { .. } => ErrorCode::E9004,
        }
    }

    /// Nodes this error points at.
    pub fn nodes(&self) -> Vec<Node> {
        match self {
            CompileError::Malformed { .. } | CompileError::MissingDependency { .. } => Vec::new(),
            CompileError::UnboundVariable { node, .. } => vec![node.clone()],
            CompileError::InternalConsistency { nodes, .. } => nodes.clone(),
            CompileError::TypeMismatch { node, found, .. } => vec![node.clone(), found.clone()],
            CompileError::DomainCapability { domain, .. } => vec![domain.clone()],
            CompileError::NonConvergence { last, .. } => vec![last.clone()],
        }
    }
}
