//! Common subexpression elimination.
//!
//! One traversal that canonicalizes and deduplicates:
//!
//! 1. Children and the type are processed first (bottom-up).
//! 2. Operands of AC operators (`And`, `Or`, `Add`, `Mul`) are flattened
//!    into their parent and sorted by canonical key.
//! 3. The node is looked up in the table; a hit is returned in its place,
//!    a miss is inserted.
//!
//! # Bound Variables
//!
//! A node with free de Bruijn indices means different things under
//! different binders, so its table key includes the frame ids of the
//! binders it can see (the innermost `free_depth` frames). Every binder
//! entry gets a fresh frame id. Closed nodes are keyed by canonical key
//! alone and are shared everywhere.
//!
//! # Idempotence
//!
//! When the rebuilt children and type are pointer-identical to the input's,
//! the input node itself is used, so `cse(cse(t))` returns `cse(t)` as the
//! identical object.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tess_bind::first_hoas;
use tess_ir::{ensure_sufficient_stack, CanonKey, Children, CompileError, Node, NodeAddr};
use tess_pass::{Context, Pass};

type Frames = SmallVec<[u32; 4]>;

#[derive(Clone, Eq, PartialEq, Hash)]
struct TableKey {
    key: CanonKey,
    frames: Frames,
}

/// A reusable CSE table.
///
/// Every root passed to [`Cse::run`] is deduplicated against the same
/// table, so independent terms share their common closed subtrees.
#[derive(Default)]
pub struct Cse {
    table: FxHashMap<TableKey, Node>,
    /// Entries keep their input alive so addresses stay unique.
    memo: FxHashMap<(NodeAddr, Frames), (Node, Node)>,
    frames: Vec<u32>,
    next_frame: u32,
    hits: usize,
}

/// Canonicalize `root` against a fresh table.
pub fn cse(root: &Node) -> Result<Node, CompileError> {
    Cse::new().run(root)
}

impl Cse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize and deduplicate `root`.
    ///
    /// Input must be in de Bruijn form; a HOAS node is an
    /// [`InternalConsistency`](CompileError::InternalConsistency) error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, root: &Node) -> Result<Node, CompileError> {
        if let Some(hoas) = first_hoas(root) {
            return Err(CompileError::internal(
                format!("CSE input contains HOAS node {hoas}"),
                [hoas],
            ));
        }
        let result = self.visit(root)?;
        tracing::debug!(table = self.table.len(), hits = self.hits, "cse complete");
        Ok(result)
    }

    /// Number of distinct nodes in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn frames_for(&self, node: &Node) -> Frames {
        let visible = (node.free_depth() as usize).min(self.frames.len());
        self.frames[self.frames.len() - visible..].iter().copied().collect()
    }

    fn visit(&mut self, node: &Node) -> Result<Node, CompileError> {
        let memo_key = (node.addr(), self.frames_for(node));
        if let Some((_, done)) = self.memo.get(&memo_key) {
            return Ok(done.clone());
        }
        let result = ensure_sufficient_stack(|| self.visit_uncached(node))?;
        self.memo.insert(memo_key, (node.clone(), result.clone()));
        Ok(result)
    }

    fn visit_uncached(&mut self, node: &Node) -> Result<Node, CompileError> {
        let ty = node.ty().map(|t| self.visit(t)).transpose()?;

        let mut children = Children::with_capacity(node.children().len());
        for (i, child) in node.children().iter().enumerate() {
            let canonical = if node.is_debruijn_scope(i) {
                self.next_frame += 1;
                self.frames.push(self.next_frame);
                let body = self.visit(child);
                self.frames.pop();
                body?
            } else {
                self.visit(child)?
            };
            children.push(canonical);
        }

        if node.kind().is_ac() {
            children = flatten(node, children);
            children.sort_by_key(Node::key);
        }

        let candidate = node.rebuild_if_changed(children, ty);
        self.intern(candidate)
    }

    fn intern(&mut self, candidate: Node) -> Result<Node, CompileError> {
        let key = TableKey {
            key: candidate.key(),
            frames: self.frames_for(&candidate),
        };
        match self.table.get(&key) {
            Some(existing) => {
                if !same_shape(existing, &candidate) {
                    return Err(CompileError::internal(
                        "canonical key collision between different nodes",
                        [existing.clone(), candidate],
                    ));
                }
                self.hits += 1;
                Ok(existing.clone())
            }
            None => {
                self.table.insert(key, candidate.clone());
                Ok(candidate)
            }
        }
    }
}

/// Splice same-operator children into the parent's operand list.
fn flatten(node: &Node, children: Children) -> Children {
    if !children.iter().any(|c| c.kind() == node.kind()) {
        return children;
    }
    let mut flat = Children::with_capacity(children.len() * 2);
    for child in children {
        if child.kind() == node.kind() {
            flat.extend(child.children().iter().cloned());
        } else {
            flat.push(child);
        }
    }
    flat
}

/// Structural comparison of two nodes with equal keys.
///
/// Children are compared by value: closed subtrees built under different
/// binder frames are equal but need not be the same object.
fn same_shape(a: &Node, b: &Node) -> bool {
    a.kind() == b.kind()
        && a.fields() == b.fields()
        && a.children().len() == b.children().len()
        && a.children().iter().zip(b.children()).all(|(x, y)| x == y)
        && a.ty() == b.ty()
}

/// [`Cse`] as a pipeline pass. The table lives as long as the pass, so
/// fixed-point iterations keep returning the same canonical objects.
#[derive(Default)]
pub struct CsePass {
    table: Cse,
}

impl CsePass {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pass for CsePass {
    fn name(&self) -> &'static str {
        "cse"
    }

    fn run(&mut self, root: &Node, _: &mut Context) -> Result<Node, CompileError> {
        self.table.run(root)
    }
}
