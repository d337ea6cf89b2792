//! Problem definition: nodes, regions and the read-only duration and demand tables.

use crate::demand::HistoryEntry;
use crate::error::{Error, Result, Stage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Index of a node inside [`Problem::nodes`]. The warehouse is always node 0.
pub type NodeId = usize;

/// Name used for the warehouse when a scenario does not provide one.
pub const DEFAULT_WAREHOUSE: &str = "Warehouse";

/// Day type, each with its own demand figures and traffic multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Weekday,
    Saturday,
}

impl DayType {
    /// Column label used in reports and errors.
    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Saturday => "saturday",
        }
    }
}

/// A warehouse or store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub is_warehouse: bool,
}

impl Node {
    /// Create a new node.
    pub fn new(id: NodeId, name: &str, is_warehouse: bool) -> Self {
        Node {
            id,
            name: name.to_string(),
            is_warehouse,
        }
    }
}

/// One `(from, to) -> minutes` travel record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationEntry {
    pub from: String,
    pub to: String,
    pub duration: f64,
}

impl DurationEntry {
    pub fn new(from: &str, to: &str, duration: f64) -> Self {
        DurationEntry {
            from: from.to_string(),
            to: to.to_string(),
            duration,
        }
    }
}

/// Mean pallet demand of one store per day type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandEntry {
    pub store: String,
    pub weekday: f64,
    pub saturday: f64,
}

impl DemandEntry {
    pub fn new(store: &str, weekday: f64, saturday: f64) -> Self {
        DemandEntry {
            store: store.to_string(),
            weekday,
            saturday,
        }
    }
}

/// One column of the region table. Empty cells pad shorter columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionColumn {
    pub name: String,
    pub stores: Vec<String>,
}

impl RegionColumn {
    pub fn new(name: &str, stores: &[&str]) -> Self {
        RegionColumn {
            name: name.to_string(),
            stores: stores.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A named group of stores that candidate routes are generated within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub stores: Vec<NodeId>,
}

/// Complete travel-time matrix, indexed by [`NodeId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurationTable {
    matrix: Vec<Vec<f64>>,
}

impl DurationTable {
    /// Build the matrix from triples, failing on the first ordered pair left undefined.
    pub fn from_entries(nodes: &[Node], entries: &[DurationEntry]) -> Result<Self> {
        let index = name_index(nodes);
        let n = nodes.len();
        let mut matrix = vec![vec![f64::NAN; n]; n];

        for i in 0..n {
            matrix[i][i] = 0.0;
        }

        for entry in entries {
            // Trip logs may mention nodes outside the planned scenario.
            let from = index.get(entry.from.as_str());
            let to = index.get(entry.to.as_str());
            if let (Some(&from), Some(&to)) = (from, to) {
                if !entry.duration.is_finite() || entry.duration < 0.0 {
                    return Err(Error::InvalidInput(format!(
                        "duration from '{}' to '{}' is {}",
                        entry.from, entry.to, entry.duration
                    )));
                }
                matrix[from][to] = entry.duration;
            }
        }

        for i in 0..n {
            for j in 0..n {
                if matrix[i][j].is_nan() {
                    return Err(Error::MissingDuration {
                        from: nodes[i].name.clone(),
                        to: nodes[j].name.clone(),
                    });
                }
            }
        }

        Ok(DurationTable { matrix })
    }

    /// Travel minutes from one node to another.
    pub fn get(&self, from: NodeId, to: NodeId) -> f64 {
        self.matrix[from][to]
    }
}

/// Expected demand per store and day type, indexed by [`NodeId`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandTable {
    weekday: Vec<f64>,
    saturday: Vec<f64>,
}

impl DemandTable {
    /// Build the table, requiring an entry for every store.
    pub fn from_entries(nodes: &[Node], entries: &[DemandEntry]) -> Result<Self> {
        let index = name_index(nodes);
        let mut weekday = vec![f64::NAN; nodes.len()];
        let mut saturday = vec![f64::NAN; nodes.len()];

        for entry in entries {
            if let Some(&id) = index.get(entry.store.as_str()) {
                for (column, value) in [("weekday", entry.weekday), ("saturday", entry.saturday)] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(Error::InvalidInput(format!(
                            "{} demand of '{}' is {}",
                            column, entry.store, value
                        )));
                    }
                }
                weekday[id] = entry.weekday;
                saturday[id] = entry.saturday;
            }
        }

        for node in nodes {
            if node.is_warehouse {
                weekday[node.id] = 0.0;
                saturday[node.id] = 0.0;
            } else if weekday[node.id].is_nan() {
                return Err(Error::MissingDemand {
                    store: node.name.clone(),
                    column: "mean".to_string(),
                });
            }
        }

        Ok(DemandTable { weekday, saturday })
    }

    /// Demand of every node for the given day type.
    pub fn column(&self, day_type: DayType) -> &[f64] {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Saturday => &self.saturday,
        }
    }

    /// Expected demand of a single store.
    pub fn get(&self, store: NodeId, day_type: DayType) -> f64 {
        self.column(day_type)[store]
    }
}

/// Represents a delivery planning instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nodes: Vec<Node>,
    pub regions: Vec<Region>,
    pub durations: DurationTable,
    pub demands: DemandTable,
}

impl Problem {
    /// The warehouse node id.
    pub const WAREHOUSE: NodeId = 0;

    /// Create a new problem. Stores are taken from the region columns in order.
    pub fn new(
        name: &str,
        warehouse: &str,
        regions: &[RegionColumn],
        durations: &[DurationEntry],
        demands: &[DemandEntry],
    ) -> Result<Self> {
        let mut nodes = vec![Node::new(Self::WAREHOUSE, warehouse, true)];
        let mut seen: HashMap<String, NodeId> = HashMap::new();
        seen.insert(warehouse.to_string(), Self::WAREHOUSE);

        let mut parsed_regions = Vec::with_capacity(regions.len());
        for column in regions {
            let mut stores = Vec::new();
            for cell in column.stores.iter().map(|s| s.trim()) {
                if cell.is_empty() {
                    continue;
                }
                if seen.contains_key(cell) {
                    return Err(Error::InvalidInput(format!(
                        "'{}' appears more than once in the region table",
                        cell
                    )));
                }
                let id = nodes.len();
                nodes.push(Node::new(id, cell, false));
                seen.insert(cell.to_string(), id);
                stores.push(id);
            }
            parsed_regions.push(Region {
                name: column.name.clone(),
                stores,
            });
        }

        let durations = DurationTable::from_entries(&nodes, durations)?;
        let demands = DemandTable::from_entries(&nodes, demands)?;

        Ok(Problem {
            name: name.to_string(),
            nodes,
            regions: parsed_regions,
            durations,
            demands,
        })
    }

    /// Travel minutes between two nodes.
    pub fn get_duration(&self, from: NodeId, to: NodeId) -> f64 {
        self.durations.get(from, to)
    }

    /// All store ids (every node except the warehouse).
    pub fn stores(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| !node.is_warehouse)
            .map(|node| node.id)
            .collect()
    }

    /// Get the number of stores.
    pub fn get_store_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Name of a node.
    pub fn node_name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    /// Look up a node by name.
    pub fn node_id(&self, name: &str) -> Result<NodeId> {
        self.nodes
            .iter()
            .find(|node| node.name == name)
            .map(|node| node.id)
            .ok_or_else(|| Error::UnknownNode {
                stage: Stage::Loading,
                node: name.to_string(),
            })
    }
}

/// Serialized planning scenario consumed by the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_warehouse")]
    pub warehouse: String,
    pub regions: Vec<RegionColumn>,
    pub durations: Vec<DurationEntry>,
    pub demand: Vec<DemandEntry>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

fn default_warehouse() -> String {
    DEFAULT_WAREHOUSE.to_string()
}

impl Scenario {
    /// Load a scenario from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Build the problem this scenario describes.
    pub fn to_problem(&self) -> Result<Problem> {
        Problem::new(
            &self.name,
            &self.warehouse,
            &self.regions,
            &self.durations,
            &self.demand,
        )
    }
}

fn name_index(nodes: &[Node]) -> HashMap<&str, NodeId> {
    nodes.iter().map(|node| (node.name.as_str(), node.id)).collect()
}
