//! S-expression rendering of nodes for diagnostics and debugging.
//!
//! `(add (lit 1) #0)`. Bound variables print as `#k`, placeholders as
//! `?id`, free variables as `$id`. Types are omitted except through
//! [`Node::display_typed`]. Output is truncated below a fixed depth so
//! diagnostics on very deep terms stay readable.

use std::fmt;

use crate::{Field, Kind, Node};

/// Depth below which subterms are elided as `…`.
const MAX_DEPTH: usize = 12;

struct Printer<'a> {
    node: &'a Node,
    depth: usize,
    typed: bool,
}

impl fmt::Display for Printer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node;
        if self.depth >= MAX_DEPTH {
            return f.write_str("…");
        }

        match (node.kind(), node.fields()) {
            (Kind::Lit, [Field::Literal(lit)]) => write!(f, "{lit}")?,
            (Kind::BoundVar, [Field::Index(k)]) => write!(f, "#{k}")?,
            (Kind::Placeholder, [Field::Binder(Some(id))]) => write!(f, "{id}")?,
            (Kind::Var, [Field::Var(id)]) => write!(f, "{id}")?,
            (Kind::UnitT | Kind::BoolT | Kind::IntT, _) => f.write_str(node.kind().name())?,
            (kind, fields) => {
                write!(f, "({kind}")?;
                for field in fields {
                    write!(f, " :{field}")?;
                }
                for child in node.children() {
                    let printer = Printer {
                        node: child,
                        depth: self.depth + 1,
                        typed: false,
                    };
                    write!(f, " {printer}")?;
                }
                f.write_str(")")?;
            }
        }

        if self.typed {
            if let Some(ty) = node.ty() {
                let printer = Printer {
                    node: ty,
                    depth: self.depth + 1,
                    typed: false,
                };
                write!(f, " : {printer}")?;
            }
        }
        Ok(())
    }
}

impl Node {
    /// Render with the type of the root appended.
    pub fn display_typed(&self) -> impl fmt::Display + '_ {
        Printer {
            node: self,
            depth: 0,
            typed: true,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer {
            node: self,
            depth: 0,
            typed: false,
        };
        write!(f, "{printer}")
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
