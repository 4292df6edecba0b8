//! Hover and selection highlighting.
//!
//! Selecting a node emphasizes the node, all the edges touching it and their
//! endpoints. Selecting an edge emphasizes only that edge and its two endpoints.

use std::collections::BTreeSet;

use log::debug;

use crate::config::*;
use crate::graph::FlowGraph;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Selection {
    Node(NodeId),
    /// An index in `FlowGraph::edges`.
    Edge(usize),
}

/// The subgraph induced by a selection.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Highlight {
    pub nodes: BTreeSet<NodeId>,
    pub edges: BTreeSet<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Emphasis {
    /// Nothing is selected.
    Normal,
    Emphasized,
    Dimmed,
}

pub fn highlight_node(graph: &FlowGraph, id: NodeId) -> Result<Highlight, FlowErrors> {
    graph.node(id).ok_or(FlowErrors::UnknownNode(id))?;
    let mut h = Highlight::default();
    h.nodes.insert(id);
    for (idx, e) in graph.edges.iter().enumerate() {
        if e.source == id || e.target == id {
            h.edges.insert(idx);
            h.nodes.insert(e.source);
            h.nodes.insert(e.target);
        }
    }
    Ok(h)
}

pub fn highlight_edge(graph: &FlowGraph, idx: usize) -> Result<Highlight, FlowErrors> {
    let selected = graph.edge(idx).ok_or(FlowErrors::UnknownEdge(idx))?;
    let mut h = Highlight::default();
    h.nodes.insert(selected.source);
    h.nodes.insert(selected.target);
    for (other_idx, e) in graph.edges.iter().enumerate() {
        if e.source == selected.source && e.target == selected.target {
            h.edges.insert(other_idx);
        }
    }
    Ok(h)
}

pub fn highlight(graph: &FlowGraph, selection: Selection) -> Result<Highlight, FlowErrors> {
    match selection {
        Selection::Node(id) => highlight_node(graph, id),
        Selection::Edge(idx) => highlight_edge(graph, idx),
    }
}

/// The emphasis state of a rendered graph.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct HighlightState {
    current: Option<(Selection, Highlight)>,
}

impl HighlightState {
    pub fn new() -> HighlightState {
        HighlightState::default()
    }

    pub fn select(&mut self, graph: &FlowGraph, selection: Selection) -> Result<(), FlowErrors> {
        let h = highlight(graph, selection)?;
        debug!(
            "select: {:?} -> {:?} nodes, {:?} edges",
            selection,
            h.nodes.len(),
            h.edges.len()
        );
        self.current = Some((selection, h));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn selection(&self) -> Option<Selection> {
        self.current.as_ref().map(|(s, _)| *s)
    }

    pub fn node_emphasis(&self, id: NodeId) -> Emphasis {
        match &self.current {
            None => Emphasis::Normal,
            Some((_, h)) if h.nodes.contains(&id) => Emphasis::Emphasized,
            Some(_) => Emphasis::Dimmed,
        }
    }

    pub fn edge_emphasis(&self, idx: usize) -> Emphasis {
        match &self.current {
            None => Emphasis::Normal,
            Some((_, h)) if h.edges.contains(&idx) => Emphasis::Emphasized,
            Some(_) => Emphasis::Dimmed,
        }
    }
}
