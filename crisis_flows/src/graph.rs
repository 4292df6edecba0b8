use crate::config::*;

/// The aggregated flow graph, ready to be handed to a layout.
///
/// Nodes are stored in the order in which they were first encountered, and
/// `nodes[i].id == NodeId(i)`. Edges are stored in the order of their first
/// occurrence, after merging.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlowGraph {
    pub levels: Vec<HierarchyLevel>,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    /// Number of records of the range that made it into the hierarchy.
    pub record_count: usize,
    /// Number of records of the range dropped for an unknown group or type.
    pub excluded_count: usize,
}

impl FlowGraph {
    pub(crate) fn assemble(
        levels: Vec<HierarchyLevel>,
        mut nodes: Vec<FlowNode>,
        edges: Vec<FlowEdge>,
        record_count: usize,
        excluded_count: usize,
    ) -> FlowGraph {
        let mut inbound: Vec<u64> = vec![0; nodes.len()];
        let mut outbound: Vec<u64> = vec![0; nodes.len()];
        for e in edges.iter() {
            outbound[e.source.0 as usize] += e.value;
            inbound[e.target.0 as usize] += e.value;
        }
        for (idx, n) in nodes.iter_mut().enumerate() {
            n.throughput = inbound[idx].max(outbound[idx]);
        }
        FlowGraph {
            levels,
            nodes,
            edges,
            record_count,
            excluded_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&FlowNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn edge(&self, idx: usize) -> Option<&FlowEdge> {
        self.edges.get(idx)
    }

    pub fn find_node(&self, level: HierarchyLevel, name: &str) -> Option<&FlowNode> {
        self.nodes
            .iter()
            .find(|n| n.level == level && n.name == name)
    }

    pub fn find_edge(&self, source: NodeId, target: NodeId) -> Option<(usize, &FlowEdge)> {
        self.edges
            .iter()
            .enumerate()
            .find(|(_, e)| e.source == source && e.target == target)
    }

    pub fn nodes_at(&self, level: HierarchyLevel) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    /// The edges leaving this node, with their index.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = (usize, &FlowEdge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.source == id)
    }

    /// The edges entering this node, with their index.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = (usize, &FlowEdge)> {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.target == id)
    }

    pub fn inbound_total(&self, id: NodeId) -> u64 {
        self.incoming(id).map(|(_, e)| e.value).sum()
    }

    pub fn outbound_total(&self, id: NodeId) -> u64 {
        self.outgoing(id).map(|(_, e)| e.value).sum()
    }

    /// The column of a level in this graph.
    pub fn column_of(&self, level: HierarchyLevel) -> Option<usize> {
        self.levels.iter().position(|l| *l == level)
    }
}
