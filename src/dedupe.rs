//! Candidate pool keyed by store set, keeping the cheapest route per set.

use crate::route::{Route, StoreSet};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Candidate routes with at most one route per distinct store set.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    routes: HashMap<StoreSet, Route>,
}

impl CandidatePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        CandidatePool::default()
    }

    /// Insert a route, keeping whichever of it and an existing route with the
    /// same store set is cheaper on an owned truck. Returns true if the route was kept.
    pub fn insert(&mut self, route: Route) -> bool {
        match self.routes.entry(route.store_set()) {
            Entry::Vacant(entry) => {
                entry.insert(route);
                true
            }
            Entry::Occupied(mut entry) => {
                if is_preferred(&route, entry.get()) {
                    entry.insert(route);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Number of distinct store sets in the pool.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route kept for a store set, if any.
    pub fn get(&self, store_set: &[usize]) -> Option<&Route> {
        self.routes.get(store_set)
    }

    /// Routes ordered by store set, independent of insertion order.
    pub fn routes(&self) -> Vec<&Route> {
        let mut routes: Vec<(&StoreSet, &Route)> = self.routes.iter().collect();
        routes.sort_by(|a, b| a.0.cmp(b.0));
        routes.into_iter().map(|(_, route)| route).collect()
    }

    /// Consume the pool, returning routes ordered by store set.
    pub fn into_routes(self) -> Vec<Route> {
        let mut routes: Vec<(StoreSet, Route)> = self.routes.into_iter().collect();
        routes.sort_by(|a, b| a.0.cmp(&b.0));
        routes.into_iter().map(|(_, route)| route).collect()
    }
}

impl Extend<Route> for CandidatePool {
    fn extend<I: IntoIterator<Item = Route>>(&mut self, iter: I) {
        for route in iter {
            self.insert(route);
        }
    }
}

impl FromIterator<Route> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        let mut pool = CandidatePool::new();
        pool.extend(iter);
        pool
    }
}

/// Collapses routes visiting identical store sets to the cheapest one.
pub struct RouteDeduplicator;

impl RouteDeduplicator {
    /// Remove duplicates in a single pass over the routes.
    pub fn dedupe(routes: Vec<Route>) -> Vec<Route> {
        routes.into_iter().collect::<CandidatePool>().into_routes()
    }
}

/// Lower owned cost wins; equal costs fall back to the node sequence so the
/// survivor does not depend on input order.
fn is_preferred(candidate: &Route, current: &Route) -> bool {
    if candidate.owned_cost != current.owned_cost {
        return candidate.owned_cost < current.owned_cost;
    }
    candidate.nodes < current.nodes
}
