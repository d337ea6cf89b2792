//! Selected delivery plan and its tabular form.

use crate::problem::{NodeId, Problem};
use crate::route::{Route, TruckType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic identifier of a route inside a plan.
pub type RouteId = usize;

/// A set of routes covering every store exactly once.
///
/// Route ids are positions in `routes`; simulation works on copies and never
/// changes a plan it was given.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub routes: Vec<Route>,
}

impl Plan {
    /// Create a plan from routes.
    pub fn new(routes: Vec<Route>) -> Self {
        Plan { routes }
    }

    /// Get the number of routes.
    pub fn get_route_count(&self) -> usize {
        self.routes.len()
    }

    /// Number of routes driven by owned trucks.
    pub fn owned_count(&self) -> usize {
        self.count(TruckType::Owned)
    }

    /// Number of routes driven by leased trucks.
    pub fn leased_count(&self) -> usize {
        self.count(TruckType::Leased)
    }

    fn count(&self, truck: TruckType) -> usize {
        self.routes.iter().filter(|r| r.truck == truck).count()
    }

    /// Sum of route costs under their assigned truck types.
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(|r| r.cost()).sum()
    }

    /// Ids of routes visiting a store.
    pub fn routes_visiting(&self, store: NodeId) -> Vec<RouteId> {
        self.routes
            .iter()
            .enumerate()
            .filter(|(_, route)| route.visits(store))
            .map(|(id, _)| id)
            .collect()
    }

    /// Check that every store is visited by exactly one route and no route
    /// visits anything else.
    pub fn is_partition_of(&self, stores: &[NodeId]) -> bool {
        let visited: usize = self.routes.iter().map(|r| r.stores().len()).sum();
        visited == stores.len()
            && stores
                .iter()
                .all(|&store| self.routes_visiting(store).len() == 1)
    }

    /// One row per route, as persisted.
    pub fn rows(&self, problem: &Problem) -> Vec<PlanRow> {
        self.routes
            .iter()
            .enumerate()
            .map(|(id, route)| PlanRow {
                route_id: format!("r{}", id + 1),
                route: route.describe(problem),
                truck_type: route.truck,
                cost: route.cost(),
            })
            .collect()
    }
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan:")?;
        writeln!(f, "  Cost: {:.2}", self.total_cost())?;
        writeln!(f, "  Owned: {}", self.owned_count())?;
        writeln!(f, "  Leased: {}", self.leased_count())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {}: {:?} ({}, Load: {:.2}, Time: {:.2}, Cost: {:.2})",
                i,
                route.nodes,
                route.truck,
                route.load,
                route.time,
                route.cost()
            )?;
        }

        Ok(())
    }
}

/// Persisted form of a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRow {
    pub route_id: String,
    pub route: Vec<String>,
    pub truck_type: TruckType,
    pub cost: f64,
}
