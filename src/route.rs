//! Route representation and the two truck cost variants.

use crate::cost::{CostModel, TimeModel};
use crate::problem::{NodeId, Problem};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Canonical signature of a route: its stores, sorted, without the warehouse.
pub type StoreSet = Vec<NodeId>;

/// Fleet a route is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckType {
    /// Own fleet, limited to trucks x shifts routes and billed by shift and overtime
    Owned,
    /// Leased fleet, unlimited and billed per started block
    Leased,
}

impl TruckType {
    /// Cost of driving a route of `time` minutes with this truck type.
    pub fn cost(self, time: f64, model: &CostModel) -> f64 {
        match self {
            TruckType::Owned => model.owned_cost(time),
            TruckType::Leased => model.leased_cost(time),
        }
    }
}

impl fmt::Display for TruckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TruckType::Owned => f.write_str("owned"),
            TruckType::Leased => f.write_str("leased"),
        }
    }
}

/// A closed tour from the warehouse through one or more stores.
///
/// Routes are values: changing the stops or the truck type produces a new
/// route rather than updating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Node sequence, starting and ending at the warehouse
    pub nodes: Vec<NodeId>,
    /// Drive plus unload minutes
    pub time: f64,
    /// Pallets carried under the demand the route was evaluated with
    pub load: f64,
    /// Cost if driven by an owned truck
    pub owned_cost: f64,
    /// Cost if driven by a leased truck
    pub leased_cost: f64,
    /// Truck type the route is assigned to
    pub truck: TruckType,
}

impl Route {
    /// Evaluate time, load and both costs of a node sequence.
    pub fn evaluate(
        nodes: Vec<NodeId>,
        demand: &[f64],
        problem: &Problem,
        time_model: &TimeModel,
        cost_model: &CostModel,
        truck: TruckType,
    ) -> Self {
        let time = time_model.route_time(&nodes, problem);
        let load = load_of(&nodes, demand);

        Route {
            nodes,
            time,
            load,
            owned_cost: TruckType::Owned.cost(time, cost_model),
            leased_cost: TruckType::Leased.cost(time, cost_model),
            truck,
        }
    }

    /// Cost under the assigned truck type.
    pub fn cost(&self) -> f64 {
        match self.truck {
            TruckType::Owned => self.owned_cost,
            TruckType::Leased => self.leased_cost,
        }
    }

    /// The same route assigned to another truck type.
    pub fn with_truck(&self, truck: TruckType) -> Self {
        Route {
            truck,
            ..self.clone()
        }
    }

    /// The same route with its load recomputed under another demand.
    pub fn with_demand(&self, demand: &[f64]) -> Self {
        Route {
            load: load_of(&self.nodes, demand),
            ..self.clone()
        }
    }

    /// Stores visited, in order.
    pub fn stores(&self) -> &[NodeId] {
        if self.nodes.len() < 2 {
            return &[];
        }
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Sorted store set, used as the deduplication key.
    pub fn store_set(&self) -> StoreSet {
        self.stores().iter().copied().sorted().collect()
    }

    /// Check if the route visits a store.
    pub fn visits(&self, store: NodeId) -> bool {
        self.stores().contains(&store)
    }

    /// Check if the route exceeds the truck capacity.
    pub fn exceeds_capacity(&self, capacity: f64) -> bool {
        self.load > capacity
    }

    /// Starts and ends at the warehouse, visits at least one store, never repeats a store.
    pub fn is_well_formed(&self) -> bool {
        if self.nodes.len() < 3 {
            return false;
        }
        let first = self.nodes[0];
        let last = self.nodes[self.nodes.len() - 1];
        if first != Problem::WAREHOUSE || last != Problem::WAREHOUSE {
            return false;
        }

        let mut seen = HashSet::new();
        self.stores()
            .iter()
            .all(|&store| store != Problem::WAREHOUSE && seen.insert(store))
    }

    /// Node names joined for display and persistence.
    pub fn describe(&self, problem: &Problem) -> Vec<String> {
        self.nodes
            .iter()
            .map(|&id| problem.node_name(id).to_string())
            .collect()
    }
}

/// Total demand of the stores in a node sequence.
pub fn load_of(nodes: &[NodeId], demand: &[f64]) -> f64 {
    nodes
        .iter()
        .filter(|&&id| id != Problem::WAREHOUSE)
        .map(|&id| demand[id])
        .sum()
}
