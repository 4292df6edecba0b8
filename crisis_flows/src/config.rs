// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The label substituted for a missing categorical value.
pub const UNKNOWN: &str = "Unknown";

/// The label substituted for a missing event name.
pub const UNNAMED_EVENT: &str = "Unnamed event";

/// One row of the natural disasters dataset, as read from the input files.
///
/// All the fields are optional: the readers do not reject incomplete rows,
/// the defaults are applied when the hierarchy is built.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DisasterRecord {
    pub year: Option<i32>,
    pub group: Option<String>,
    pub subgroup: Option<String>,
    pub disaster_type: Option<String>,
    pub subtype: Option<String>,
    pub event_name: Option<String>,
}

/// The tiers of the disaster classification, from the most general to the
/// individual events.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum HierarchyLevel {
    Group,
    Subgroup,
    Type,
    Subtype,
    Event,
}

impl HierarchyLevel {
    pub const ALL: [HierarchyLevel; 5] = [
        HierarchyLevel::Group,
        HierarchyLevel::Subgroup,
        HierarchyLevel::Type,
        HierarchyLevel::Subtype,
        HierarchyLevel::Event,
    ];

    /// The position of the level in the full hierarchy (0 for groups, 4 for events).
    pub fn depth(&self) -> usize {
        match self {
            HierarchyLevel::Group => 0,
            HierarchyLevel::Subgroup => 1,
            HierarchyLevel::Type => 2,
            HierarchyLevel::Subtype => 3,
            HierarchyLevel::Event => 4,
        }
    }

    pub fn is_categorical(&self) -> bool {
        *self != HierarchyLevel::Event
    }

    /// The name used in configuration files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            HierarchyLevel::Group => "group",
            HierarchyLevel::Subgroup => "subgroup",
            HierarchyLevel::Type => "type",
            HierarchyLevel::Subtype => "subtype",
            HierarchyLevel::Event => "event",
        }
    }

    pub fn from_key(key: &str) -> Result<HierarchyLevel, FlowErrors> {
        let normalized = key.trim().to_lowercase();
        HierarchyLevel::ALL
            .iter()
            .find(|l| l.key() == normalized)
            .cloned()
            .ok_or_else(|| FlowErrors::UnknownLevel(key.to_string()))
    }
}

/// An inclusive range of years.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Builds a range out of two bounds given in any order.
    pub fn new(a: i32, b: i32) -> YearRange {
        YearRange {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

// ******** Output data structures *********

/// A handle to a node of a flow graph. It is the index of the node in
/// `FlowGraph::nodes`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlowNode {
    pub id: NodeId,
    pub level: HierarchyLevel,
    pub name: String,
    /// Only set for the event nodes: the number of occurrences of this event
    /// name in all the records of the range, whatever their path.
    pub value: Option<u64>,
    /// The largest of the inbound and outbound totals of this node.
    pub throughput: u64,
}

/// A weighted transition between two nodes of adjacent levels.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlowEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub value: u64,
}

/// The result of a render pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RenderOutcome {
    Graph(crate::FlowGraph),
    /// No record falls in the requested range. Callers must show an explicit
    /// message rather than an empty chart.
    NoDataInRange(YearRange),
    /// The dataset itself is empty.
    MissingDataset,
}

impl RenderOutcome {
    pub fn graph(&self) -> Option<&crate::FlowGraph> {
        match self {
            RenderOutcome::Graph(g) => Some(g),
            _ => None,
        }
    }
}

/// Errors that prevent the aggregation from running.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FlowErrors {
    /// A flow needs between 2 and 5 levels.
    InvalidLevelCount(usize),
    /// The levels must follow the hierarchy order, without repetition.
    UnorderedLevels,
    UnknownLevel(String),
    /// A commodity filter that is not one of all, fuel, essential, other.
    UnknownCategory(String),
    UnknownNode(NodeId),
    UnknownEdge(usize),
}

impl Error for FlowErrors {}

impl Display for FlowErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowErrors::InvalidLevelCount(n) => {
                write!(f, "a flow needs between 2 and 5 levels, got {}", n)
            }
            FlowErrors::UnorderedLevels => write!(
                f,
                "levels must be distinct and follow the order group, subgroup, type, subtype, event"
            ),
            FlowErrors::UnknownLevel(s) => write!(f, "unknown hierarchy level {:?}", s),
            FlowErrors::UnknownCategory(s) => write!(f, "unknown commodity category {:?}", s),
            FlowErrors::UnknownNode(id) => write!(f, "no node with id {}", id.0),
            FlowErrors::UnknownEdge(idx) => write!(f, "no edge at index {}", idx),
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct FlowRules {
    pub levels: Vec<HierarchyLevel>,
}

impl FlowRules {
    /// Builds the rules from level names such as `["group", "type", "event"]`.
    pub fn from_keys(keys: &[String]) -> Result<FlowRules, FlowErrors> {
        let mut levels: Vec<HierarchyLevel> = Vec::new();
        for k in keys {
            levels.push(HierarchyLevel::from_key(k)?);
        }
        let rules = FlowRules { levels };
        rules.check()?;
        Ok(rules)
    }

    pub fn check(&self) -> Result<(), FlowErrors> {
        if self.levels.len() < 2 || self.levels.len() > HierarchyLevel::ALL.len() {
            return Err(FlowErrors::InvalidLevelCount(self.levels.len()));
        }
        // Strictly increasing depths: this also keeps the event level last.
        if self.levels.windows(2).any(|w| w[0].depth() >= w[1].depth()) {
            return Err(FlowErrors::UnorderedLevels);
        }
        Ok(())
    }

    pub fn has_events(&self) -> bool {
        self.levels.last() == Some(&HierarchyLevel::Event)
    }

    pub fn categorical_levels(&self) -> Vec<HierarchyLevel> {
        self.levels
            .iter()
            .filter(|l| l.is_categorical())
            .cloned()
            .collect()
    }
}

impl Default for FlowRules {
    fn default() -> FlowRules {
        FlowRules {
            levels: HierarchyLevel::ALL.to_vec(),
        }
    }
}
