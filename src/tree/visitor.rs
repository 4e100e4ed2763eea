//! Per-kind dispatch over tree nodes.
//!
//! A visitor overrides only the kinds it cares about. Unhandled kinds fall back
//! along the kind hierarchy: Domain -> MapBranch -> generic, SeqBranch ->
//! generic, Leaf -> generic. Adding a node kind means adding one trait method
//! with a sensible default, not editing every consumer.

use super::{NodeBody, NodeId, Tree};

pub trait NodeVisitor<P> {
    type Output;

    fn visit_map_branch(&mut self, tree: &Tree<P>, id: NodeId) -> Self::Output {
        self.generic_visit(tree, id)
    }

    /// Domains are map branches; unless overridden they are visited as such.
    fn visit_domain(&mut self, tree: &Tree<P>, id: NodeId) -> Self::Output {
        self.visit_map_branch(tree, id)
    }

    fn visit_seq_branch(&mut self, tree: &Tree<P>, id: NodeId) -> Self::Output {
        self.generic_visit(tree, id)
    }

    fn visit_leaf(&mut self, tree: &Tree<P>, id: NodeId, _payload: &P) -> Self::Output {
        self.generic_visit(tree, id)
    }

    fn generic_visit(&mut self, tree: &Tree<P>, id: NodeId) -> Self::Output;
}

/// Route `id` to the most specific method `visitor` provides.
pub fn dispatch<P, V>(tree: &Tree<P>, id: NodeId, visitor: &mut V) -> V::Output
where
    V: NodeVisitor<P> + ?Sized,
{
    match tree.node(id).body() {
        NodeBody::Map(_) => visitor.visit_map_branch(tree, id),
        NodeBody::Domain(_) => visitor.visit_domain(tree, id),
        NodeBody::Seq(_) => visitor.visit_seq_branch(tree, id),
        NodeBody::Leaf(payload) => visitor.visit_leaf(tree, id, payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::StubDomain;
    use crate::tree::{Detached, Payload};

    /// Records which handler ran.
    struct Labeler;

    impl NodeVisitor<u32> for Labeler {
        type Output = String;

        fn visit_map_branch(&mut self, tree: &Tree<u32>, id: NodeId) -> String {
            format!("map:{}", tree.node(id).name())
        }

        fn visit_leaf(&mut self, _tree: &Tree<u32>, _id: NodeId, payload: &u32) -> String {
            format!("leaf:{payload}")
        }

        fn generic_visit(&mut self, tree: &Tree<u32>, id: NodeId) -> String {
            format!("generic:{}", tree.node(id).name())
        }
    }

    /// Overrides the domain handler only.
    struct DomainOnly;

    impl NodeVisitor<u32> for DomainOnly {
        type Output = &'static str;

        fn visit_domain(&mut self, _tree: &Tree<u32>, _id: NodeId) -> &'static str {
            "domain"
        }

        fn generic_visit(&mut self, _tree: &Tree<u32>, _id: NodeId) -> &'static str {
            "generic"
        }
    }

    fn sample() -> Tree<u32> {
        let mut tree = Tree::new();
        tree.insert(&["group", "cmd"], Payload::Raw(7)).unwrap();
        tree.insert(&["seq"], Payload::Node(Detached::seq("seq")))
            .unwrap();
        tree.insert(
            &["system"],
            Payload::Node(Detached::domain("system", StubDomain::new(&[]))),
        )
        .unwrap();
        tree
    }

    #[test]
    fn exact_kind_handlers_win() {
        let tree = sample();
        let group = tree.get(&["group"]).unwrap();
        let cmd = tree.get(&["group", "cmd"]).unwrap();
        assert_eq!(dispatch(&tree, group, &mut Labeler), "map:group");
        assert_eq!(dispatch(&tree, cmd, &mut Labeler), "leaf:7");
    }

    #[test]
    fn domain_falls_back_to_map_branch() {
        let tree = sample();
        let system = tree.get(&["system"]).unwrap();
        assert_eq!(dispatch(&tree, system, &mut Labeler), "map:system");
    }

    #[test]
    fn unhandled_kind_uses_generic() {
        let tree = sample();
        let seq = tree.get(&["seq"]).unwrap();
        assert_eq!(dispatch(&tree, seq, &mut Labeler), "generic:seq");
    }

    #[test]
    fn more_specific_override_beats_fallback() {
        let tree = sample();
        let system = tree.get(&["system"]).unwrap();
        let group = tree.get(&["group"]).unwrap();
        assert_eq!(dispatch(&tree, system, &mut DomainOnly), "domain");
        assert_eq!(dispatch(&tree, group, &mut DomainOnly), "generic");
    }
}
