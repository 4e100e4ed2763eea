/*!
Node model for the command tree.

Nodes live in an arena owned by [`Tree`](super::Tree) and are addressed by
[`NodeId`] handles. A node knows its parent by handle only, so the tree holds
no ownership cycles.

Kinds:
  - MapBranch : children indexed by unique name, insertion order kept
  - SeqBranch : ordered children, duplicate names allowed, no name lookup
  - Leaf      : terminal node carrying an opaque payload
  - Domain    : a MapBranch that also carries a [`Domain`] implementation

Nodes are built either implicitly by `Tree::insert` (raw payloads become
leaves, missing path segments become MapBranches) or ahead of time as a
[`Detached`] subtree which is then attached in one step.
*/

use std::collections::HashMap;
use std::fmt;

use crate::domain::Domain;

/// Stable handle to a node inside a [`Tree`](super::Tree).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

/// Closed set of concrete node kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    MapBranch,
    SeqBranch,
    Leaf,
    Domain,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::MapBranch => "map-branch",
            NodeKind::SeqBranch => "seq-branch",
            NodeKind::Leaf => "leaf",
            NodeKind::Domain => "domain",
        };
        f.write_str(s)
    }
}

/// Name-indexed children. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct MapBranch {
    order: Vec<NodeId>,
    index: HashMap<String, NodeId>,
}

impl MapBranch {
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.order
    }

    /// Caller must have checked `contains` first.
    pub(super) fn push(&mut self, name: &str, id: NodeId) {
        self.index.insert(name.to_string(), id);
        self.order.push(id);
    }
}

#[derive(Debug, Default)]
pub struct SeqBranch {
    children: Vec<NodeId>,
}

impl SeqBranch {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(super) fn push(&mut self, id: NodeId) {
        self.children.push(id);
    }
}

/// A MapBranch that also implements the verb vocabulary.
pub struct DomainBranch {
    pub(super) map: MapBranch,
    pub(super) domain: Box<dyn Domain>,
}

impl DomainBranch {
    pub fn domain(&self) -> &dyn Domain {
        self.domain.as_ref()
    }
}

pub enum NodeBody<P> {
    Map(MapBranch),
    Seq(SeqBranch),
    Leaf(P),
    Domain(DomainBranch),
}

pub struct Node<P> {
    pub(super) name: String,
    pub(super) parent: Option<NodeId>,
    pub(super) body: NodeBody<P>,
}

impl<P> Node<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn body(&self) -> &NodeBody<P> {
        &self.body
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Map(_) => NodeKind::MapBranch,
            NodeBody::Seq(_) => NodeKind::SeqBranch,
            NodeBody::Leaf(_) => NodeKind::Leaf,
            NodeBody::Domain(_) => NodeKind::Domain,
        }
    }

    /// Children in iteration order (empty for leaves).
    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Map(m) => m.children(),
            NodeBody::Seq(s) => s.children(),
            NodeBody::Domain(d) => d.map.children(),
            NodeBody::Leaf(_) => &[],
        }
    }

    /// Name lookup. Only map-shaped branches (MapBranch, Domain) support it.
    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.as_map().and_then(|m| m.get(name))
    }

    pub fn as_map(&self) -> Option<&MapBranch> {
        match &self.body {
            NodeBody::Map(m) => Some(m),
            NodeBody::Domain(d) => Some(&d.map),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&P> {
        match &self.body {
            NodeBody::Leaf(p) => Some(p),
            _ => None,
        }
    }

    pub fn domain(&self) -> Option<&dyn Domain> {
        match &self.body {
            NodeBody::Domain(d) => Some(d.domain()),
            _ => None,
        }
    }
}

impl<P> fmt::Debug for Node<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("parent", &self.parent)
            .field("children", &self.children())
            .finish()
    }
}

/// Shape of a detached (not yet attached) node.
pub enum DetachedBody<P> {
    Map,
    Seq,
    Leaf(P),
    Domain(Box<dyn Domain>),
}

/// A node subtree built before it is attached to a tree.
///
/// Ownership guarantees a detached node has no parent; attaching consumes it.
pub struct Detached<P> {
    pub(super) name: String,
    pub(super) body: DetachedBody<P>,
    pub(super) children: Vec<Detached<P>>,
}

impl<P> Detached<P> {
    pub fn map(name: impl Into<String>) -> Self {
        Self::with_body(name, DetachedBody::Map)
    }

    /// Sequence branches are not produced by the command table.
    #[allow(dead_code)]
    pub fn seq(name: impl Into<String>) -> Self {
        Self::with_body(name, DetachedBody::Seq)
    }

    pub fn leaf(name: impl Into<String>, payload: P) -> Self {
        Self::with_body(name, DetachedBody::Leaf(payload))
    }

    pub fn domain(name: impl Into<String>, domain: impl Domain + 'static) -> Self {
        Self::with_body(name, DetachedBody::Domain(Box::new(domain)))
    }

    fn with_body(name: impl Into<String>, body: DetachedBody<P>) -> Self {
        Self {
            name: name.into(),
            body,
            children: Vec::new(),
        }
    }

    /// Add a child. Children under a leaf are rejected when attached.
    pub fn with_child(mut self, child: Detached<P>) -> Self {
        self.children.push(child);
        self
    }
}

/// What `Tree::insert` places at the final path segment.
pub enum Payload<P> {
    /// Wrapped in a fresh Leaf.
    Raw(P),
    /// Attached as-is, keeping its kind and its children.
    Node(Detached<P>),
}

impl<P> From<Detached<P>> for Payload<P> {
    fn from(node: Detached<P>) -> Self {
        Payload::Node(node)
    }
}
