//! Inheritance graph between registered types.
//!
//! Edges point from a derived type to its direct base. Single inheritance
//! keeps every node's out-degree at most one, so the ancestor chain is a walk
//! along outgoing edges.

use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use rustc_hash::FxHashMap;
use textlambda_core::TypeHash;

#[derive(Debug, Default, Clone)]
pub struct Hierarchy {
    graph: DiGraph<TypeHash, ()>,
    nodes: FxHashMap<TypeHash, NodeIndex>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, hash: TypeHash) -> NodeIndex {
        *self
            .nodes
            .entry(hash)
            .or_insert_with(|| self.graph.add_node(hash))
    }

    pub fn set_base(&mut self, derived: TypeHash, base: TypeHash) {
        let d = self.add_type(derived);
        let b = self.add_type(base);
        if self.graph.find_edge(d, b).is_none() {
            self.graph.add_edge(d, b, ());
        }
    }

    pub fn contains(&self, hash: TypeHash) -> bool {
        self.nodes.contains_key(&hash)
    }

    /// Whether `derived` is `base` or inherits from it.
    pub fn derives_from(&self, derived: TypeHash, base: TypeHash) -> bool {
        match (self.nodes.get(&derived), self.nodes.get(&base)) {
            (Some(&d), Some(&b)) => has_path_connecting(&self.graph, d, b, None),
            _ => false,
        }
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, hash: TypeHash) -> Vec<TypeHash> {
        let mut chain = Vec::new();
        let Some(&start) = self.nodes.get(&hash) else {
            return chain;
        };
        let mut current = start;
        while let Some(next) = self
            .graph
            .neighbors_directed(current, Direction::Outgoing)
            .next()
        {
            if next == start || chain.contains(&self.graph[next]) {
                break;
            }
            chain.push(self.graph[next]);
            current = next;
        }
        chain
    }

    /// `hash` and every type deriving from it.
    pub fn descendants(&self, hash: TypeHash) -> Vec<TypeHash> {
        let Some(&start) = self.nodes.get(&hash) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(reversed) {
            found.push(self.graph[node]);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(name: &str) -> TypeHash {
        TypeHash::of_type(name)
    }

    #[test]
    fn chain_and_paths() {
        let mut tree = Hierarchy::new();
        tree.set_base(h("Shape"), h("System.Object"));
        tree.set_base(h("Circle"), h("Shape"));
        tree.set_base(h("Square"), h("Shape"));

        assert_eq!(tree.ancestors(h("Circle")), vec![h("Shape"), h("System.Object")]);
        assert!(tree.derives_from(h("Circle"), h("System.Object")));
        assert!(tree.derives_from(h("Circle"), h("Circle")));
        assert!(!tree.derives_from(h("Shape"), h("Circle")));
        assert!(!tree.derives_from(h("Unknown"), h("Shape")));

        let mut below = tree.descendants(h("Shape"));
        below.sort();
        let mut expected = vec![h("Shape"), h("Circle"), h("Square")];
        expected.sort();
        assert_eq!(below, expected);
    }
}
