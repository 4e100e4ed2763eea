/*!
Arena-backed rooted tree with path-based insert/lookup and pre-order walk.

Contract:
  - insert(path, payload) -> NodeId
      prefix segments: descend existing map branches, create missing ones
      last segment   : raw payload -> new Leaf, detached node -> attached as-is
  - get(path) -> Option<NodeId>   strict descent, map-shaped branches only
  - walk() -> pre-order iterator, root first, siblings in insertion order

The shape is fixed once startup registration is done; everything after that
reads through `&Tree`.
*/

pub mod node;
pub mod visitor;

use thiserror::Error;

pub use node::{
    Detached, DetachedBody, DomainBranch, MapBranch, Node, NodeBody, NodeId, NodeKind, Payload,
    SeqBranch,
};
pub use visitor::{NodeVisitor, dispatch};

pub const ROOT_NAME: &str = "root";

/// Structural errors raised while building the tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("path is empty")]
    EmptyPath,
    #[error("node '{path}' already exists")]
    PathCollision { path: String },
    #[error("cannot traverse '{segment}': it is a {kind}, not a map branch")]
    PathTraversal { segment: String, kind: NodeKind },
}

pub struct Tree<P> {
    nodes: Vec<Node<P>>,
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Tree<P> {
    /// Empty tree with a MapBranch root named `root`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: ROOT_NAME.to_string(),
                parent: None,
                body: NodeBody::Map(MapBranch::default()),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node<P> {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.node(id).child(name)
    }

    pub fn insert<S: AsRef<str>>(
        &mut self,
        path: &[S],
        payload: Payload<P>,
    ) -> Result<NodeId, TreeError> {
        let (last, prefix) = path.split_last().ok_or(TreeError::EmptyPath)?;

        let mut current = self.root();
        for segment in prefix {
            let segment = segment.as_ref();
            self.ensure_map(current)?;
            current = match self.child(current, segment) {
                Some(existing) => existing,
                None => self.attach(current, Detached::map(segment))?,
            };
        }

        let node = match payload {
            Payload::Raw(data) => Detached::leaf(last.as_ref(), data),
            Payload::Node(mut detached) => {
                detached.name = last.as_ref().to_string();
                detached
            }
        };
        self.attach(current, node)
    }

    /// Attach a detached subtree under a map or domain node, returning the
    /// new node's id. The whole subtree is checked before anything is linked.
    pub fn attach(&mut self, parent: NodeId, node: Detached<P>) -> Result<NodeId, TreeError> {
        self.ensure_map(parent)?;
        if self.child(parent, &node.name).is_some() {
            return Err(self.collision(parent, &node.name));
        }
        let mut path: Vec<String> = self.path_of(parent).into_iter().map(str::to_string).collect();
        check_detached(&node, &mut path)?;
        Ok(self.graft(parent, node))
    }

    fn graft(&mut self, parent: NodeId, node: Detached<P>) -> NodeId {
        let Detached {
            name,
            body,
            children,
        } = node;

        let id = NodeId(self.nodes.len());
        let body = match body {
            DetachedBody::Map => NodeBody::Map(MapBranch::default()),
            DetachedBody::Seq => NodeBody::Seq(SeqBranch::default()),
            DetachedBody::Leaf(p) => NodeBody::Leaf(p),
            DetachedBody::Domain(domain) => NodeBody::Domain(DomainBranch {
                map: MapBranch::default(),
                domain,
            }),
        };
        match &mut self.nodes[parent.0].body {
            NodeBody::Map(m) => m.push(&name, id),
            NodeBody::Domain(d) => d.map.push(&name, id),
            NodeBody::Seq(s) => s.push(id),
            NodeBody::Leaf(_) => unreachable!("leaf parents are rejected before grafting"),
        }
        self.nodes.push(Node {
            name,
            parent: Some(parent),
            body,
        });

        for child in children {
            self.graft(id, child);
        }
        id
    }

    /// Strict descent from the root. Any miss yields `None`.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        path.iter()
            .try_fold(self.root(), |id, segment| self.child(id, segment.as_ref()))
    }

    /// Pre-order traversal: every parent precedes its descendants.
    pub fn walk(&self) -> Walk<'_, P> {
        Walk {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// The node itself, then each ancestor up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |current| self.node(*current).parent)
    }

    /// Segment names from the root (exclusive) down to `id`.
    pub fn path_of(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter(|a| *a != self.root())
            .map(|a| self.node(a).name())
            .collect();
        names.reverse();
        names
    }

    /// First Domain with the given name, searched over the whole tree.
    pub fn find_domain(&self, name: &str) -> Option<NodeId> {
        self.walk().find(|id| {
            let node = self.node(*id);
            node.kind() == NodeKind::Domain && node.name() == name
        })
    }

    fn ensure_map(&self, id: NodeId) -> Result<(), TreeError> {
        let node = self.node(id);
        if node.as_map().is_some() {
            Ok(())
        } else {
            Err(TreeError::PathTraversal {
                segment: node.name.clone(),
                kind: node.kind(),
            })
        }
    }

    fn collision(&self, parent: NodeId, name: &str) -> TreeError {
        let mut segments = self.path_of(parent);
        segments.push(name);
        TreeError::PathCollision {
            path: segments.join(" "),
        }
    }
}

/// Shape rules for a subtree about to be grafted: leaves have no children
/// and map-shaped nodes have unique child names. `path` ends at the parent.
fn check_detached<P>(node: &Detached<P>, path: &mut Vec<String>) -> Result<(), TreeError> {
    path.push(node.name.clone());
    match &node.body {
        DetachedBody::Leaf(_) if !node.children.is_empty() => {
            return Err(TreeError::PathTraversal {
                segment: node.name.clone(),
                kind: NodeKind::Leaf,
            });
        }
        DetachedBody::Map | DetachedBody::Domain(_) => {
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = node.children.iter().find(|c| !seen.insert(c.name.as_str())) {
                path.push(dup.name.clone());
                return Err(TreeError::PathCollision {
                    path: path.join(" "),
                });
            }
        }
        _ => {}
    }
    for child in &node.children {
        check_detached(child, path)?;
    }
    path.pop();
    Ok(())
}

/// Iterator returned by [`Tree::walk`].
pub struct Walk<'a, P> {
    tree: &'a Tree<P>,
    stack: Vec<NodeId>,
}

impl<P> Iterator for Walk<'_, P> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.node(id).children().iter().rev().copied());
        Some(id)
    }
}

/* --------------------------------- Tests ---------------------------------- */
