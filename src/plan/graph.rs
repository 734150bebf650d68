//! Arena-backed dependency graph and the two traversals planning needs.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeIndex`]; each node keeps
//! the sorted set of its direct dependents. Duplicate edges collapse into one.

use crate::catalog::id::{CatalogObject, DependencyEdge};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<CatalogObject>,
    lookup: HashMap<CatalogObject, NodeIndex>,
    dependents: Vec<BTreeSet<NodeIndex>>,
}

impl DependencyGraph {
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DependencyEdge>) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            let source = graph.add_node(&edge.source);
            let dependent = graph.add_node(&edge.dependent);
            graph.dependents[source.0].insert(dependent);
        }
        graph
    }

    fn add_node(&mut self, object: &CatalogObject) -> NodeIndex {
        if let Some(&idx) = self.lookup.get(object) {
            return idx;
        }
        let idx = NodeIndex(self.nodes.len());
        self.nodes.push(object.clone());
        self.dependents.push(BTreeSet::new());
        self.lookup.insert(object.clone(), idx);
        idx
    }

    pub fn node_index(&self, object: &CatalogObject) -> Option<NodeIndex> {
        self.lookup.get(object).copied()
    }

    pub fn object(&self, idx: NodeIndex) -> &CatalogObject {
        &self.nodes[idx.0]
    }

    /// Direct dependents of `idx`.
    pub fn dependents(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.dependents[idx.0].iter().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.dependents.iter().map(BTreeSet::len).sum()
    }

    /// Edges `(source, dependent)` with both ends inside `nodes`.
    pub fn induced_edges<'a>(
        &'a self,
        nodes: &'a BTreeSet<NodeIndex>,
    ) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + 'a {
        nodes.iter().flat_map(move |&u| {
            self.dependents(u)
                .filter(move |v| nodes.contains(v))
                .map(move |v| (u, v))
        })
    }
}

/// Every node reachable from `start` by following source → dependent edges.
///
/// `start` is only part of the result when it lies on a cycle.
pub fn descendants(graph: &DependencyGraph, start: NodeIndex) -> BTreeSet<NodeIndex> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<NodeIndex> = graph.dependents(start).collect();

    while let Some(idx) = stack.pop() {
        if seen.insert(idx) {
            stack.extend(graph.dependents(idx).filter(|d| !seen.contains(d)));
        }
    }

    seen
}

/// Topologically order the subgraph induced by `nodes`.
///
/// Among nodes that are ready at the same time, the smallest object
/// (schema, then name, then kind, then oid) is emitted first, which makes the
/// order reproducible. When the subgraph has a cycle, one cycle is returned
/// as `Err`, listed in edge direction.
pub fn topological_order(
    graph: &DependencyGraph,
    nodes: &BTreeSet<NodeIndex>,
) -> Result<Vec<NodeIndex>, Vec<NodeIndex>> {
    let mut in_degree: HashMap<NodeIndex, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    for (_, v) in graph.induced_edges(nodes) {
        *in_degree.entry(v).or_default() += 1;
    }

    let mut ready: BinaryHeap<Reverse<(&CatalogObject, NodeIndex)>> = in_degree
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&n, _)| Reverse((graph.object(n), n)))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse((_, idx))) = ready.pop() {
        order.push(idx);
        for dependent in graph.dependents(idx).filter(|d| nodes.contains(d)) {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse((graph.object(dependent), dependent)));
                }
            }
        }
    }

    if order.len() == nodes.len() {
        return Ok(order);
    }

    let placed: BTreeSet<NodeIndex> = order.into_iter().collect();
    let remaining: BTreeSet<NodeIndex> = nodes.difference(&placed).copied().collect();
    Err(find_cycle(graph, &remaining))
}

/// Extract one cycle from `remaining`, the nodes Kahn's algorithm could not
/// place. Each of them has at least one predecessor inside the set, so walking
/// predecessors must eventually revisit a node.
fn find_cycle(graph: &DependencyGraph, remaining: &BTreeSet<NodeIndex>) -> Vec<NodeIndex> {
    let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    for (u, v) in graph.induced_edges(remaining) {
        predecessor.entry(v).or_insert(u);
    }

    let Some(&start) = remaining.iter().next() else {
        return Vec::new();
    };

    let mut walk = vec![start];
    let mut position: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
    let mut current = start;
    while let Some(&prev) = predecessor.get(&current) {
        if let Some(&at) = position.get(&prev) {
            // walk[at..] is the cycle in predecessor order
            let mut cycle = walk.split_off(at);
            cycle.reverse();
            return cycle;
        }
        position.insert(prev, walk.len());
        walk.push(prev);
        current = prev;
    }

    Vec::new()
}
