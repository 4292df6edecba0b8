mod config;
mod graph;

pub mod boxplot;
pub mod builder;
pub mod interaction;
pub mod layout;
pub mod manual;
pub mod present;
pub mod session;
pub mod years;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::graph::*;

// **** Private structures ****

// The values of one record for all the levels, once the defaults are applied.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ClassifiedRecord<'a> {
    // Indexed by HierarchyLevel::depth
    categories: [&'a str; 4],
    event_name: &'a str,
}

impl<'a> ClassifiedRecord<'a> {
    /// Applies the defaults to a record.
    /// Returns None if the record cannot be placed in the hierarchy (unknown group or type).
    fn classify(record: &'a DisasterRecord) -> Option<ClassifiedRecord<'a>> {
        let c = ClassifiedRecord {
            categories: [
                category(&record.group),
                category(&record.subgroup),
                category(&record.disaster_type),
                category(&record.subtype),
            ],
            event_name: match record.event_name.as_deref() {
                Some(s) if !s.is_empty() => s,
                _ => UNNAMED_EVENT,
            },
        };
        let group = c.categories[HierarchyLevel::Group.depth()];
        let disaster_type = c.categories[HierarchyLevel::Type.depth()];
        if group == UNKNOWN || disaster_type == UNKNOWN {
            None
        } else {
            Some(c)
        }
    }

    fn key(&self, categorical_levels: &[HierarchyLevel]) -> CompositeKey<'a> {
        CompositeKey(
            categorical_levels
                .iter()
                .map(|l| self.categories[l.depth()])
                .collect(),
        )
    }
}

fn category(field: &Option<String>) -> &str {
    match field.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => UNKNOWN,
    }
}

// The values of a record for each categorical level of the flow, in level order.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
struct CompositeKey<'a>(Vec<&'a str>);

// All the records that share the same composite key.
#[derive(Debug, Clone)]
struct PathGroup<'a> {
    key: CompositeKey<'a>,
    count: u64,
    // Event names in order of appearance, with their number of occurrences under this key.
    events: Vec<(&'a str, u64)>,
    event_index: HashMap<&'a str, usize>,
}

impl<'a> PathGroup<'a> {
    fn new(key: CompositeKey<'a>) -> PathGroup<'a> {
        PathGroup {
            key,
            count: 0,
            events: Vec::new(),
            event_index: HashMap::new(),
        }
    }

    fn add(&mut self, event_name: &'a str) {
        self.count += 1;
        match self.event_index.get(event_name) {
            Some(&idx) => {
                self.events[idx].1 += 1;
            }
            None => {
                self.event_index.insert(event_name, self.events.len());
                self.events.push((event_name, 1));
            }
        }
    }
}

// Assigns the node handles. The identity of a node is its level and its name.
struct HierarchyBuilder<'a> {
    node_ids: HashMap<(HierarchyLevel, &'a str), NodeId>,
    nodes: Vec<FlowNode>,
}

impl<'a> HierarchyBuilder<'a> {
    fn new() -> HierarchyBuilder<'a> {
        HierarchyBuilder {
            node_ids: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Returns the node for this level and name, registering it the first time it is seen.
    /// The value is only recorded at registration.
    fn node_id(&mut self, level: HierarchyLevel, name: &'a str, value: Option<u64>) -> NodeId {
        if let Some(id) = self.node_ids.get(&(level, name)) {
            return *id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.node_ids.insert((level, name), id);
        self.nodes.push(FlowNode {
            id,
            level,
            name: name.to_string(),
            value,
            throughput: 0,
        });
        id
    }
}

/// Keeps the records whose year falls in the range.
///
/// Records without a year cannot be placed in any range and are dropped.
pub fn filter_records(coll: &[DisasterRecord], range: YearRange) -> Vec<&DisasterRecord> {
    coll.iter()
        .filter(|r| matches!(r.year, Some(y) if range.contains(y)))
        .collect()
}

/// Runs the flow aggregation for the given records and range.
///
/// Arguments:
/// * `coll` the full dataset
/// * `rules` the levels of the hierarchy to display
/// * `range` the years to keep
///
/// An empty dataset or an empty range are not errors: they are reported through
/// the returned `RenderOutcome`.
pub fn run_flow_aggregation(
    coll: &[DisasterRecord],
    rules: &FlowRules,
    range: YearRange,
) -> Result<RenderOutcome, FlowErrors> {
    rules.check()?;
    info!(
        "run_flow_aggregation: processing {:?} records, range: {}, levels: {:?}",
        coll.len(),
        range,
        rules.levels
    );

    if coll.is_empty() {
        warn!("run_flow_aggregation: the dataset is empty, nothing to draw");
        return Ok(RenderOutcome::MissingDataset);
    }

    let filtered = filter_records(coll, range);
    debug!(
        "run_flow_aggregation: {:?} records in range {}",
        filtered.len(),
        range
    );
    if filtered.is_empty() {
        info!("run_flow_aggregation: no record in range {}", range);
        return Ok(RenderOutcome::NoDataInRange(range));
    }

    let graph = build_flow_graph(&filtered, rules);
    if graph.is_empty() {
        info!(
            "run_flow_aggregation: all the {:?} records in range {} have an unknown group or type",
            filtered.len(),
            range
        );
        return Ok(RenderOutcome::NoDataInRange(range));
    }

    info!(
        "run_flow_aggregation: {:?} nodes, {:?} edges ({:?} records used, {:?} excluded)",
        graph.nodes.len(),
        graph.edges.len(),
        graph.record_count,
        graph.excluded_count
    );
    Ok(RenderOutcome::Graph(graph))
}

/// Builds the flow graph of records that have already been filtered.
///
/// Composite keys, and therefore nodes, are processed in the order in which they
/// first appear in the records.
pub fn build_flow_graph(records: &[&DisasterRecord], rules: &FlowRules) -> FlowGraph {
    let categorical_levels = rules.categorical_levels();

    let mut paths: Vec<PathGroup> = Vec::new();
    let mut path_index: HashMap<CompositeKey, usize> = HashMap::new();
    // Occurrences of each event name over all the paths.
    let mut event_counts: HashMap<&str, u64> = HashMap::new();
    let mut excluded: usize = 0;

    for r in records.iter() {
        let c = match ClassifiedRecord::classify(r) {
            Some(c) => c,
            None => {
                debug!(
                    "build_flow_graph: skipping record with unknown group or type: {:?}",
                    r
                );
                excluded += 1;
                continue;
            }
        };
        let key = c.key(&categorical_levels);
        let idx = match path_index.get(&key) {
            Some(idx) => *idx,
            None => {
                path_index.insert(key.clone(), paths.len());
                paths.push(PathGroup::new(key));
                paths.len() - 1
            }
        };
        paths[idx].add(c.event_name);
        *event_counts.entry(c.event_name).or_insert(0) += 1;
    }
    debug!(
        "build_flow_graph: {:?} distinct paths, {:?} distinct events",
        paths.len(),
        event_counts.len()
    );

    let mut hierarchy = HierarchyBuilder::new();
    let edges = aggregate_flows(
        &paths,
        &categorical_levels,
        rules.has_events(),
        &event_counts,
        &mut hierarchy,
    );

    FlowGraph::assemble(
        rules.levels.clone(),
        hierarchy.nodes,
        edges,
        records.len() - excluded,
        excluded,
    )
}

fn aggregate_flows<'a>(
    paths: &[PathGroup<'a>],
    categorical_levels: &[HierarchyLevel],
    with_events: bool,
    event_counts: &HashMap<&'a str, u64>,
    hierarchy: &mut HierarchyBuilder<'a>,
) -> Vec<FlowEdge> {
    let mut raw_edges: Vec<FlowEdge> = Vec::new();
    for path in paths.iter() {
        let ids: Vec<NodeId> = categorical_levels
            .iter()
            .zip(path.key.0.iter())
            .map(|(level, name)| hierarchy.node_id(*level, *name, None))
            .collect();

        if with_events {
            if let Some(last) = ids.last() {
                for (name, count_in_path) in path.events.iter() {
                    let global_count = event_counts.get(name).cloned();
                    let event_id = hierarchy.node_id(HierarchyLevel::Event, *name, global_count);
                    raw_edges.push(FlowEdge {
                        source: *last,
                        target: event_id,
                        value: *count_in_path,
                    });
                }
            }
        }

        for pair in ids.windows(2) {
            raw_edges.push(FlowEdge {
                source: pair[0],
                target: pair[1],
                value: path.count,
            });
        }
    }
    debug!("aggregate_flows: {:?} raw edges", raw_edges.len());
    merge_edges(raw_edges)
}

/// Sums the weights of the edges that share the same endpoints.
/// A merged edge keeps the position of its first occurrence.
fn merge_edges(raw_edges: Vec<FlowEdge>) -> Vec<FlowEdge> {
    let mut merged: Vec<FlowEdge> = Vec::new();
    let mut index: HashMap<(NodeId, NodeId), usize> = HashMap::new();
    for e in raw_edges {
        match index.get(&(e.source, e.target)) {
            Some(&idx) => {
                merged[idx].value += e.value;
            }
            None => {
                index.insert((e.source, e.target), merged.len());
                merged.push(e);
            }
        }
    }
    merged
}
