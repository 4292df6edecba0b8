//! Positions the nodes and links of a flow graph on a canvas.
//!
//! A rendering target receives a `LaidOutGraph`: every node carries its box and
//! every link its band at both ends, with resolved node handles.

use std::cmp::Ordering;

use log::debug;

use crate::config::*;
use crate::graph::FlowGraph;

const DEFAULT_MARGIN_X: f64 = 200.0;
const DEFAULT_MARGIN_Y: f64 = 40.0;
const DEFAULT_WIDTH: f64 = 1200.0;
const DEFAULT_HEIGHT: f64 = 660.0;
const DEFAULT_NODE_WIDTH: f64 = 20.0;
const DEFAULT_NODE_PADDING: f64 = 14.0;

/// The drawing area, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

impl Default for Extent {
    fn default() -> Extent {
        Extent {
            x0: DEFAULT_MARGIN_X,
            y0: DEFAULT_MARGIN_Y,
            x1: DEFAULT_WIDTH - DEFAULT_MARGIN_X,
            y1: DEFAULT_HEIGHT - DEFAULT_MARGIN_Y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutNode {
    pub id: NodeId,
    pub column: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLink {
    /// The index of the edge in `FlowGraph::edges`.
    pub edge: usize,
    pub source: NodeId,
    pub target: NodeId,
    pub value: u64,
    pub width: f64,
    /// Center of the band where it leaves the source.
    pub y0: f64,
    /// Center of the band where it enters the target.
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutGraph {
    pub extent: Extent,
    /// Indexed like `FlowGraph::nodes`.
    pub nodes: Vec<LaidOutNode>,
    /// Indexed like `FlowGraph::edges`.
    pub links: Vec<LaidOutLink>,
}

impl LaidOutGraph {
    pub fn node(&self, id: NodeId) -> Option<&LaidOutNode> {
        self.nodes.get(id.0 as usize)
    }
}

pub trait FlowLayout {
    fn layout(&self, graph: &FlowGraph) -> LaidOutGraph;
}

/// One column per level, nodes stacked in graph order.
///
/// All the columns share the same vertical scale, chosen so that the fullest
/// column fits in the extent. The space left in a column is spread evenly
/// between its nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub extent: Extent,
    pub node_width: f64,
    pub node_padding: f64,
}

impl Default for ColumnLayout {
    fn default() -> ColumnLayout {
        ColumnLayout {
            extent: Extent::default(),
            node_width: DEFAULT_NODE_WIDTH,
            node_padding: DEFAULT_NODE_PADDING,
        }
    }
}

impl ColumnLayout {
    fn column_x(&self, column: usize, column_count: usize) -> f64 {
        if column_count <= 1 {
            return self.extent.x0;
        }
        let step = (self.extent.width() - self.node_width) / ((column_count - 1) as f64);
        self.extent.x0 + step * (column as f64)
    }

    fn scale(&self, columns: &[Vec<usize>], graph: &FlowGraph) -> f64 {
        columns
            .iter()
            .filter_map(|col| {
                let total: u64 = col.iter().map(|idx| graph.nodes[*idx].throughput).sum();
                if total == 0 {
                    return None;
                }
                let gaps = col.len().saturating_sub(1) as f64;
                let free = self.extent.height() - gaps * self.node_padding;
                Some((free / (total as f64)).max(0.0))
            })
            .fold(None, |acc: Option<f64>, ky| Some(acc.map_or(ky, |a| a.min(ky))))
            .unwrap_or(0.0)
    }
}

fn by_position(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl FlowLayout for ColumnLayout {
    fn layout(&self, graph: &FlowGraph) -> LaidOutGraph {
        let column_count = graph.levels.len();
        let mut columns: Vec<Vec<usize>> = vec![Vec::new(); column_count];
        for (idx, n) in graph.nodes.iter().enumerate() {
            if let Some(col) = graph.column_of(n.level) {
                columns[col].push(idx);
            }
        }
        let ky = self.scale(&columns, graph);
        debug!(
            "layout: {:?} columns, {:?} nodes, scale {:?}",
            column_count,
            graph.nodes.len(),
            ky
        );

        let mut nodes: Vec<LaidOutNode> = graph
            .nodes
            .iter()
            .map(|n| LaidOutNode {
                id: n.id,
                column: 0,
                x0: self.extent.x0,
                x1: self.extent.x0 + self.node_width,
                y0: self.extent.y0,
                y1: self.extent.y0,
            })
            .collect();

        for (col, members) in columns.iter().enumerate() {
            let x0 = self.column_x(col, column_count);
            let mut y = self.extent.y0;
            for idx in members.iter() {
                let h = (graph.nodes[*idx].throughput as f64) * ky;
                let n = &mut nodes[*idx];
                n.column = col;
                n.x0 = x0;
                n.x1 = x0 + self.node_width;
                n.y0 = y;
                n.y1 = y + h;
                y = n.y1 + self.node_padding;
            }
            let dy = (self.extent.y1 - y + self.node_padding) / ((members.len() + 1) as f64);
            if dy > 0.0 {
                for (i, idx) in members.iter().enumerate() {
                    let shift = dy * ((i + 1) as f64);
                    nodes[*idx].y0 += shift;
                    nodes[*idx].y1 += shift;
                }
            }
        }

        let mut links: Vec<LaidOutLink> = graph
            .edges
            .iter()
            .enumerate()
            .map(|(idx, e)| LaidOutLink {
                edge: idx,
                source: e.source,
                target: e.target,
                value: e.value,
                width: (e.value as f64) * ky,
                y0: 0.0,
                y1: 0.0,
            })
            .collect();

        // Bands leaving a node are ordered by the position of their target, and
        // bands entering a node by the position of their source.
        for n in graph.nodes.iter() {
            let top = nodes[n.id.0 as usize].y0;

            let mut out: Vec<usize> = graph.outgoing(n.id).map(|(idx, _)| idx).collect();
            out.sort_by(|a, b| {
                by_position(
                    nodes[links[*a].target.0 as usize].y0,
                    nodes[links[*b].target.0 as usize].y0,
                )
            });
            let mut y = top;
            for idx in out {
                links[idx].y0 = y + links[idx].width / 2.0;
                y += links[idx].width;
            }

            let mut inc: Vec<usize> = graph.incoming(n.id).map(|(idx, _)| idx).collect();
            inc.sort_by(|a, b| {
                by_position(
                    nodes[links[*a].source.0 as usize].y0,
                    nodes[links[*b].source.0 as usize].y0,
                )
            });
            let mut y = top;
            for idx in inc {
                links[idx].y1 = y + links[idx].width / 2.0;
                y += links[idx].width;
            }
        }

        LaidOutGraph {
            extent: self.extent,
            nodes,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn two_columns() -> FlowGraph {
        let rules = FlowRules {
            levels: vec![HierarchyLevel::Group, HierarchyLevel::Subgroup],
        };
        let mut b = Builder::new(&rules).unwrap();
        for _ in 0..3 {
            b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", ""], "")
                .unwrap();
        }
        b.add_record_simple(2010, ["Natural", "Meteorological", "Storm", ""], "")
            .unwrap();
        b.build(YearRange::new(2010, 2010))
            .unwrap()
            .graph()
            .cloned()
            .unwrap()
    }

    #[test]
    fn two_column_positions() {
        let g = two_columns();
        let layout = ColumnLayout {
            extent: Extent {
                x0: 0.0,
                y0: 0.0,
                x1: 200.0,
                y1: 100.0,
            },
            node_width: 20.0,
            node_padding: 10.0,
        };
        let l = layout.layout(&g);
        let natural = g.find_node(HierarchyLevel::Group, "Natural").unwrap().id;
        let hydro = g.find_node(HierarchyLevel::Subgroup, "Hydrological").unwrap().id;
        let meteo = g.find_node(HierarchyLevel::Subgroup, "Meteorological").unwrap().id;

        let n = l.node(natural).unwrap();
        assert_eq!(n.column, 0);
        assert!(close(n.x0, 0.0) && close(n.x1, 20.0));
        assert!(close(n.y0, 5.0) && close(n.y1, 95.0));

        let h = l.node(hydro).unwrap();
        assert!(close(h.x0, 180.0));
        assert!(close(h.y0, 0.0) && close(h.y1, 67.5));
        let m = l.node(meteo).unwrap();
        assert!(close(m.y0, 77.5) && close(m.y1, 100.0));

        let (to_hydro, _) = g.find_edge(natural, hydro).unwrap();
        let link = &l.links[to_hydro];
        assert!(close(link.width, 67.5));
        assert!(close(link.y0, 38.75));
        assert!(close(link.y1, 33.75));
        let (to_meteo, _) = g.find_edge(natural, meteo).unwrap();
        let link = &l.links[to_meteo];
        assert!(close(link.y0, 83.75));
        assert!(close(link.y1, 88.75));
    }

    #[test]
    fn full_hierarchy_fits_in_extent() {
        let mut b = Builder::new(&FlowRules::default()).unwrap();
        b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "A")
            .unwrap();
        b.add_record_simple(2011, ["Natural", "Hydrological", "Flood", "Riverine"], "B")
            .unwrap();
        b.add_record_simple(2012, ["Natural", "Meteorological", "Storm", "Cyclone"], "C")
            .unwrap();
        b.add_record_simple(2012, ["Technological", "Transport", "Water", ""], "D")
            .unwrap();
        let g = b
            .build(YearRange::new(2010, 2012))
            .unwrap()
            .graph()
            .cloned()
            .unwrap();
        let layout = ColumnLayout::default();
        let l = layout.layout(&g);
        assert_eq!(l.nodes.len(), g.nodes.len());
        assert_eq!(l.links.len(), g.edges.len());

        let eps = 1e-6;
        let ky = l.links[0].width / (g.edges[0].value as f64);
        for (n, laid) in g.nodes.iter().zip(l.nodes.iter()) {
            assert_eq!(Some(laid.column), g.column_of(n.level));
            assert!(laid.y0 >= layout.extent.y0 - eps && laid.y1 <= layout.extent.y1 + eps);
            assert!(close(laid.y1 - laid.y0, (n.throughput as f64) * ky));
        }
        for link in l.links.iter() {
            let s = l.node(link.source).unwrap();
            let t = l.node(link.target).unwrap();
            assert_eq!(s.column + 1, t.column);
            assert!(link.y0 - link.width / 2.0 >= s.y0 - eps);
            assert!(link.y0 + link.width / 2.0 <= s.y1 + eps);
            assert!(link.y1 - link.width / 2.0 >= t.y0 - eps);
            assert!(link.y1 + link.width / 2.0 <= t.y1 + eps);
        }
    }
}
