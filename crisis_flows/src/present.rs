//! Display strings derived from a flow graph: node labels, tooltips and the
//! message shown when a range has no data.
//!
//! The strings are plain text, one item per line. Turning them into markup is
//! left to the rendering target.

use std::sync::OnceLock;

use regex::Regex;

use crate::config::*;
use crate::graph::FlowGraph;

pub fn level_name(level: HierarchyLevel) -> &'static str {
    match level {
        HierarchyLevel::Group => "Disaster Group",
        HierarchyLevel::Subgroup => "Subgroup",
        HierarchyLevel::Type => "Type",
        HierarchyLevel::Subtype => "Subtype",
        HierarchyLevel::Event => "Event",
    }
}

fn parenthesized() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^)]*\)\s*").unwrap())
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Cleans up a category name for display.
///
/// Parenthesized qualifiers are dropped, except for explosions where they carry
/// the kind of explosion. Names are never cut by length.
pub fn clean_label(name: &str) -> String {
    if name.to_lowercase().starts_with("explosion") {
        return name.trim().to_string();
    }
    let stripped = parenthesized().replace_all(name, " ");
    whitespace().replace_all(stripped.trim(), " ").to_string()
}

pub fn node_label(node: &FlowNode) -> String {
    clean_label(&node.name)
}

/// Formats a count with thousands separators: `12345` -> `12,345`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut res = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}

/// The share of `part` in `total`, in percent with one decimal.
pub fn format_share(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", (part as f64) * 100.0 / (total as f64))
}

pub fn node_tooltip(graph: &FlowGraph, id: NodeId) -> Result<String, FlowErrors> {
    let node = graph.node(id).ok_or(FlowErrors::UnknownNode(id))?;
    let mut lines: Vec<String> = vec![
        node.name.clone(),
        format!("Level: {}", level_name(node.level)),
        format!("Total events: {}", format_count(node.throughput)),
    ];
    if let Some(value) = node.value {
        lines.push(format!("Overall occurrences: {}", format_count(value)));
    }
    let outgoing: Vec<String> = graph
        .outgoing(id)
        .filter_map(|(_, e)| {
            graph.node(e.target).map(|t| {
                format!(
                    "{}: {} ({}%)",
                    t.name,
                    format_count(e.value),
                    format_share(e.value, node.throughput)
                )
            })
        })
        .collect();
    if !outgoing.is_empty() {
        lines.push("---".to_string());
        lines.extend(outgoing);
    }
    Ok(lines.join("\n"))
}

pub fn edge_tooltip(graph: &FlowGraph, idx: usize) -> Result<String, FlowErrors> {
    let e = graph.edge(idx).ok_or(FlowErrors::UnknownEdge(idx))?;
    let source = graph.node(e.source).ok_or(FlowErrors::UnknownNode(e.source))?;
    let target = graph.node(e.target).ok_or(FlowErrors::UnknownNode(e.target))?;
    Ok(format!(
        "{} → {}\nEvents: {}\nShare: {}%",
        source.name,
        target.name,
        format_count(e.value),
        format_share(e.value, source.throughput)
    ))
}

pub fn no_data_message(range: YearRange) -> String {
    format!("No data available for the years {}", range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn labels() {
        assert_eq!(clean_label("Collapse (Miscellaneous)"), "Collapse");
        assert_eq!(clean_label("Explosion (Industrial)"), "Explosion (Industrial)");
        assert_eq!(clean_label("Flood (General) in north"), "Flood in north");
        assert_eq!(clean_label("  Storm  (Convective)  "), "Storm");
        assert_eq!(clean_label(""), "");
    }

    #[test]
    fn long_labels_are_kept_whole() {
        assert_eq!(
            clean_label("Tropical cyclone Chapala and Megh"),
            "Tropical cyclone Chapala and Megh"
        );
        let mut b = Builder::new(&FlowRules::default()).unwrap();
        b.add_record_simple(
            2015,
            ["Natural", "Meteorological", "Storm", "Tropical cyclone (Category 4)"],
            "Tropical cyclone Chapala and Megh",
        )
        .unwrap();
        let outcome = b.build(YearRange::new(2015, 2015)).unwrap();
        let g = outcome.graph().unwrap();
        let subtype = g.nodes_at(HierarchyLevel::Subtype).next().unwrap();
        assert_eq!(node_label(subtype), "Tropical cyclone");
        let event = g.nodes_at(HierarchyLevel::Event).next().unwrap();
        assert_eq!(node_label(event), "Tropical cyclone Chapala and Megh");
    }

    #[test]
    fn counts_and_shares() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_share(2, 3), "66.7");
        assert_eq!(format_share(1, 0), "0.0");
    }

    #[test]
    fn tooltips() {
        let mut b = Builder::new(&FlowRules::default()).unwrap();
        b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "A")
            .unwrap();
        b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Flash flood"], "A")
            .unwrap();
        b.add_record_simple(2010, ["Natural", "Hydrological", "Flood", "Riverine"], "A")
            .unwrap();
        let outcome = b.build(YearRange::new(2010, 2010)).unwrap();
        let g = outcome.graph().unwrap();

        let flood = g.find_node(HierarchyLevel::Type, "Flood").unwrap().id;
        assert_eq!(
            node_tooltip(g, flood).unwrap(),
            "Flood\nLevel: Type\nTotal events: 3\n---\nFlash flood: 2 (66.7%)\nRiverine: 1 (33.3%)"
        );

        let a = g.find_node(HierarchyLevel::Event, "A").unwrap().id;
        assert_eq!(
            node_tooltip(g, a).unwrap(),
            "A\nLevel: Event\nTotal events: 3\nOverall occurrences: 3"
        );

        let riverine = g.find_node(HierarchyLevel::Subtype, "Riverine").unwrap().id;
        let (idx, _) = g.find_edge(riverine, a).unwrap();
        assert_eq!(
            edge_tooltip(g, idx).unwrap(),
            "Riverine → A\nEvents: 1\nShare: 100.0%"
        );
    }

    #[test]
    fn no_data() {
        assert_eq!(
            no_data_message(YearRange::new(2020, 2018)),
            "No data available for the years 2018 - 2020"
        );
    }
}
