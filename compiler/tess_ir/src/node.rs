//! The immutable term node.
//!
//! `Node` is the sole term representation for both types and values. A
//! node is created once and never mutated; an "edit" builds a new node via
//! [`Node::replace`] (or one of its siblings), sharing every untouched
//! subtree with the original. Flags, free-variable depth and the canonical
//! key are computed bottom-up at construction and cached.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::error::CompileError;
use crate::kind::Sort;
use crate::{ensure_sufficient_stack, BinderId, CanonKey, Field, Kind, Literal, Name, NodeFlags, VarId};

/// Field storage; most nodes have at most two fields.
pub type Fields = SmallVec<[Field; 2]>;

/// Child storage; most nodes have at most four children.
pub type Children = SmallVec<[Node; 4]>;

/// Identity of a node allocation.
///
/// Two handles have the same address iff they point at the same node.
/// Only meaningful while some handle keeps the node alive; caches keyed by
/// address therefore also hold a handle to the node.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeAddr(usize);

/// Handle to an immutable IR node.
///
/// Cloning is a reference-count increment. Equality and hashing go through
/// the canonical key: structurally identical subtrees compare equal in
/// O(1) regardless of how they were built. Use [`Node::ptr_eq`] for
/// identity.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

struct NodeData {
    kind: Kind,
    fields: Fields,
    children: Children,
    ty: Option<Node>,
    flags: NodeFlags,
    free_depth: u32,
    key: CanonKey,
}

impl Node {
    /// Build a node, validating it against its constructor's signature.
    ///
    /// Checks arity, field kinds, the sort (type or value) of every child,
    /// and that values carry a type while types do not.
    pub fn try_new(
        kind: Kind,
        fields: impl IntoIterator<Item = Field>,
        children: impl IntoIterator<Item = Node>,
        ty: Option<Node>,
    ) -> Result<Node, CompileError> {
        let fields: Fields = fields.into_iter().collect();
        let children: Children = children.into_iter().collect();
        validate(kind, &fields, &children, ty.as_ref())?;

        let flags = compute_flags(kind, &fields, &children, ty.as_ref());
        let free_depth = compute_free_depth(kind, &fields, &children, ty.as_ref());
        let key = CanonKey::compute(kind, &fields, &children, ty.as_ref());

        Ok(Node(Arc::new(NodeData {
            kind,
            fields,
            children,
            ty,
            flags,
            free_depth,
            key,
        })))
    }

    /// Build a node that is known to be well-formed.
    ///
    /// # Panics
    /// Panics if the node is malformed: constructing one is a compiler bug,
    /// never a property of the input term.
    pub fn new(
        kind: Kind,
        fields: impl IntoIterator<Item = Field>,
        children: impl IntoIterator<Item = Node>,
        ty: Option<Node>,
    ) -> Node {
        Self::try_new(kind, fields, children, ty).unwrap_or_else(|err| panic!("{err}"))
    }

    // === Accessors ===

    #[inline]
    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.0.fields
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    /// The `index`-th child.
    ///
    /// # Panics
    /// Panics if `index` is out of range for this constructor.
    #[inline]
    pub fn child(&self, index: usize) -> &Node {
        &self.0.children[index]
    }

    /// The node's type; `None` for type nodes.
    #[inline]
    pub fn ty(&self) -> Option<&Node> {
        self.0.ty.as_ref()
    }

    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.0.flags
    }

    /// One more than the largest free de Bruijn index (0 if none is free).
    #[inline]
    pub fn free_depth(&self) -> u32 {
        self.0.free_depth
    }

    /// Canonical key of this subtree.
    #[inline]
    pub fn key(&self) -> CanonKey {
        self.0.key
    }

    #[inline]
    pub fn is_type(&self) -> bool {
        self.0.flags.contains(NodeFlags::IS_TYPE)
    }

    #[inline]
    pub fn is_domain(&self) -> bool {
        self.0.flags.contains(NodeFlags::IS_DOMAIN)
    }

    /// True if no de Bruijn index escapes this subtree.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.0.free_depth == 0
    }

    #[inline]
    pub fn addr(&self) -> NodeAddr {
        NodeAddr(Arc::as_ptr(&self.0) as usize)
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// True if child `index` sits under this node's de Bruijn binder.
    ///
    /// HOAS binders (`Binder(Some(_))`) bind by handle and do not shift
    /// indices, so they never open a de Bruijn scope.
    #[inline]
    pub fn is_debruijn_scope(&self, index: usize) -> bool {
        matches!(self.fields(), [Field::Binder(None)]) && self.kind().binder_child() == Some(index)
    }

    // === Field accessors ===

    pub fn literal(&self) -> Option<Literal> {
        match self.fields() {
            [Field::Literal(lit)] => Some(*lit),
            _ => None,
        }
    }

    /// Integer value of an `Int` literal.
    pub fn as_int(&self) -> Option<i64> {
        match self.literal() {
            Some(Literal::Int(n)) => Some(n),
            _ => None,
        }
    }

    /// Boolean value of a `Bool` literal.
    pub fn as_bool(&self) -> Option<bool> {
        match self.literal() {
            Some(Literal::Bool(b)) => Some(b),
            _ => None,
        }
    }

    /// HOAS binder handle of a binder or placeholder.
    pub fn binder(&self) -> Option<BinderId> {
        self.fields().iter().find_map(|field| match field {
            Field::Binder(id) => *id,
            _ => None,
        })
    }

    /// Index field of `BoundVar`, `Proj`, `Inj`, `DomProj`.
    pub fn index(&self) -> Option<u32> {
        self.fields().iter().find_map(|field| match field {
            Field::Index(i) => Some(*i),
            _ => None,
        })
    }

    /// The `position`-th integer field (`Slice`, `Windows`, `Tiles`).
    pub fn int_field(&self, position: usize) -> Option<i64> {
        self.fields()
            .iter()
            .filter_map(|field| match field {
                Field::Int(n) => Some(*n),
                _ => None,
            })
            .nth(position)
    }

    pub fn label(&self) -> Option<Name> {
        self.fields().iter().find_map(|field| match field {
            Field::Label(name) => Some(*name),
            _ => None,
        })
    }

    pub fn labels(&self) -> Option<&[Name]> {
        self.fields().iter().find_map(|field| match field {
            Field::Labels(names) => Some(&**names),
            _ => None,
        })
    }

    pub fn var_id(&self) -> Option<VarId> {
        self.fields().iter().find_map(|field| match field {
            Field::Var(id) => Some(*id),
            _ => None,
        })
    }

    // === Rebuilding ===

    /// Same constructor, fields and type; new children.
    ///
    /// # Panics
    /// Panics if the new children violate the constructor's arity or sorts.
    pub fn replace(&self, children: impl IntoIterator<Item = Node>) -> Node {
        Node::new(self.kind(), self.0.fields.iter().cloned(), children, self.0.ty.clone())
    }

    /// Same constructor and type; new fields and children.
    pub fn replace_fields(
        &self,
        fields: impl IntoIterator<Item = Field>,
        children: impl IntoIterator<Item = Node>,
    ) -> Node {
        Node::new(self.kind(), fields, children, self.0.ty.clone())
    }

    /// Same constructor and fields; new children and type.
    pub fn rebuild(&self, children: impl IntoIterator<Item = Node>, ty: Option<Node>) -> Node {
        Node::new(self.kind(), self.0.fields.iter().cloned(), children, ty)
    }

    /// Same node with a different type.
    pub fn with_ty(&self, ty: Node) -> Node {
        Node::new(
            self.kind(),
            self.0.fields.iter().cloned(),
            self.0.children.iter().cloned(),
            Some(ty),
        )
    }

    /// True if `children` and `ty` are pointer-identical to this node's.
    ///
    /// Rewriters use this to return the input node itself when nothing
    /// changed, preserving identity (and thus memoization and CSE
    /// idempotence) across passes.
    pub fn unchanged(&self, children: &[Node], ty: Option<&Node>) -> bool {
        let same_ty = match (self.ty(), ty) {
            (Some(a), Some(b)) => Node::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_ty
            && self.children().len() == children.len()
            && self
                .children()
                .iter()
                .zip(children)
                .all(|(a, b)| Node::ptr_eq(a, b))
    }

    /// `rebuild` unless nothing changed, in which case the node itself.
    pub fn rebuild_if_changed(&self, children: Children, ty: Option<Node>) -> Node {
        if self.unchanged(&children, ty.as_ref()) {
            self.clone()
        } else {
            self.rebuild(children, ty)
        }
    }
}

impl PartialEq for Node {
    /// Structural equality up to the order of AC operands.
    ///
    /// A key match is confirmed node by node, so a fingerprint collision
    /// never makes two different terms equal. Pairs already confirmed are
    /// not revisited; shared subtrees cost one comparison.
    fn eq(&self, other: &Self) -> bool {
        Structural::default().eq(self, other)
    }
}

#[derive(Default)]
struct Structural {
    confirmed: FxHashSet<(NodeAddr, NodeAddr)>,
}

impl Structural {
    fn eq(&mut self, a: &Node, b: &Node) -> bool {
        if Node::ptr_eq(a, b) {
            return true;
        }
        if a.key() != b.key() {
            return false;
        }
        // Any mismatch below fails the whole comparison, so a pair can be
        // recorded before it is confirmed.
        if !self.confirmed.insert((a.addr(), b.addr())) {
            return true;
        }
        ensure_sufficient_stack(|| self.eq_uncached(a, b))
    }

    fn eq_uncached(&mut self, a: &Node, b: &Node) -> bool {
        if a.kind() != b.kind() || a.fields() != b.fields() || a.children().len() != b.children().len() {
            return false;
        }
        let same_ty = match (a.ty(), b.ty()) {
            (Some(x), Some(y)) => self.eq(x, y),
            (None, None) => true,
            _ => false,
        };
        if !same_ty {
            return false;
        }
        if a.kind().is_ac() {
            let mut xs: Children = a.children().iter().cloned().collect();
            let mut ys: Children = b.children().iter().cloned().collect();
            xs.sort_by_key(Node::key);
            ys.sort_by_key(Node::key);
            xs.iter().zip(&ys).all(|(x, y)| self.eq(x, y))
        } else {
            a.children().iter().zip(b.children()).all(|(x, y)| self.eq(x, y))
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

// Construction-time computation

fn validate(kind: Kind, fields: &[Field], children: &[Node], ty: Option<&Node>) -> Result<(), CompileError> {
    let malformed = |reason: String| CompileError::Malformed { kind, reason };

    let arity = kind.arity();
    if !arity.accepts(children.len()) {
        return Err(malformed(format!(
            "expected {arity} children, found {}",
            children.len()
        )));
    }

    let signature = kind.field_signature();
    if signature.len() != fields.len()
        || signature
            .iter()
            .zip(fields)
            .any(|(expected, field)| *expected != field.kind())
    {
        let found: Vec<_> = fields.iter().map(Field::kind).collect();
        return Err(malformed(format!(
            "expected fields {signature:?}, found {found:?}"
        )));
    }

    for (i, child) in children.iter().enumerate() {
        match kind.child_sort(i) {
            Sort::Type if !child.is_type() => {
                return Err(malformed(format!("child #{i} must be a type, found {child}")));
            }
            Sort::Value if child.is_type() => {
                return Err(malformed(format!("child #{i} must be a value, found {child}")));
            }
            _ => {}
        }
    }

    match (kind.is_type(), ty) {
        (true, Some(_)) => return Err(malformed("type nodes do not carry a type".into())),
        (false, None) => return Err(malformed("value nodes must carry a type".into())),
        (false, Some(t)) if !t.is_type() => {
            return Err(malformed(format!("annotation {t} is not a type")));
        }
        _ => {}
    }

    match (kind, fields) {
        (Kind::Placeholder, [Field::Binder(None)]) => {
            Err(malformed("placeholder without a binder handle".into()))
        }
        (Kind::EnumT, [_, Field::Labels(labels)]) if labels.is_empty() => {
            Err(malformed("enumeration without labels".into()))
        }
        (Kind::Windows, [Field::Int(size), Field::Int(stride)]) if *size <= 0 || *stride <= 0 => {
            Err(malformed(format!(
                "window size and stride must be positive, found size {size}, stride {stride}"
            )))
        }
        (Kind::Tiles, [Field::Int(size)]) if *size <= 0 => {
            Err(malformed(format!("tile size must be positive, found {size}")))
        }
        (Kind::Slice, [Field::Int(lo), Field::Int(hi)]) if *lo < 0 || lo > hi => {
            Err(malformed(format!("slice bounds must satisfy 0 <= lo <= hi, found {lo}..{hi}")))
        }
        _ => Ok(()),
    }
}

fn compute_flags(kind: Kind, fields: &[Field], children: &[Node], ty: Option<&Node>) -> NodeFlags {
    let mut flags = NodeFlags::empty();
    if kind.is_type() {
        flags |= NodeFlags::IS_TYPE;
    }
    if ty.is_some_and(|t| t.kind() == Kind::DomT) {
        flags |= NodeFlags::IS_DOMAIN;
    }

    // Placeholders and HOAS binders both carry a handle.
    if fields.iter().any(|f| matches!(f, Field::Binder(Some(_)))) {
        flags |= NodeFlags::HAS_HOAS;
    }

    match kind {
        Kind::BoundVar => flags |= NodeFlags::HAS_BOUND,
        Kind::Var => flags |= NodeFlags::HAS_VAR,
        Kind::Apply if children[0].kind() == Kind::Lambda => flags |= NodeFlags::HAS_REDEX,
        Kind::ApplyT if children[0].kind() == Kind::PiT => flags |= NodeFlags::HAS_REDEX,
        _ => {}
    }

    for child in children.iter().chain(ty) {
        flags |= NodeFlags::propagate_from(child.flags());
    }
    flags
}

fn compute_free_depth(kind: Kind, fields: &[Field], children: &[Node], ty: Option<&Node>) -> u32 {
    let mut depth = match (kind, fields) {
        (Kind::BoundVar, [Field::Index(k)]) => k.saturating_add(1),
        _ => 0,
    };
    // A HOAS binder is invisible to de Bruijn indices: only `Binder(None)`
    // binders capture index 0 of their body.
    let debruijn_binder = match fields {
        [Field::Binder(None)] => kind.binder_child(),
        _ => None,
    };
    for (i, child) in children.iter().enumerate() {
        let child_depth = if debruijn_binder == Some(i) {
            child.free_depth().saturating_sub(1)
        } else {
            child.free_depth()
        };
        depth = depth.max(child_depth);
    }
    if let Some(t) = ty {
        depth = depth.max(t.free_depth());
    }
    depth
}
