//! Cheapest-insertion construction of candidate routes.

use crate::config::Config;
use crate::cost::{CostModel, TimeModel};
use crate::problem::{DayType, NodeId, Problem};
use crate::route::{Route, TruckType};
use log::debug;
use rand::Rng;

/// Builds routes by repeatedly inserting the store that lengthens the route least.
pub struct RouteBuilder<'a> {
    problem: &'a Problem,
    demand: &'a [f64],
    time_model: TimeModel,
    cost_model: CostModel,
    capacity: f64,
}

impl<'a> RouteBuilder<'a> {
    /// Create a builder over the given demand vector (indexed by node id).
    pub fn new(
        problem: &'a Problem,
        demand: &'a [f64],
        config: &Config,
        day_type: DayType,
    ) -> Self {
        RouteBuilder {
            problem,
            demand,
            time_model: TimeModel::new(config, day_type),
            cost_model: CostModel::new(config),
            capacity: config.truck_capacity,
        }
    }

    /// Grow a route from every store and emit each intermediate route as a candidate.
    ///
    /// At every growth step each unvisited store that still fits is kept with
    /// probability `1 - dropout`; growth stops once no store is left to insert.
    /// Legs touching the warehouse are scaled by `warehouse_weight` when
    /// choosing insertions, but emitted routes carry their actual time.
    pub fn build<R: Rng + ?Sized>(
        &self,
        stores: &[NodeId],
        dropout: f64,
        warehouse_weight: f64,
        rng: &mut R,
    ) -> Vec<Route> {
        let mut routes = Vec::new();

        for &seed in stores {
            let mut load = self.demand[seed];
            if load > self.capacity {
                debug!(
                    "store {} needs {} pallets, above capacity {}",
                    self.problem.node_name(seed),
                    load,
                    self.capacity
                );
                continue;
            }

            let mut nodes = vec![Problem::WAREHOUSE, seed, Problem::WAREHOUSE];

            loop {
                routes.push(self.evaluate(nodes.clone()));

                let candidates: Vec<NodeId> = stores
                    .iter()
                    .copied()
                    .filter(|&store| {
                        !nodes.contains(&store)
                            && load + self.demand[store] <= self.capacity
                            && rng.gen::<f64>() >= dropout
                    })
                    .collect();

                match self.cheapest_insertion(&nodes, &candidates, warehouse_weight) {
                    Some((store, pos)) => {
                        nodes.insert(pos, store);
                        load += self.demand[store];
                    }
                    None => break,
                }
            }
        }

        routes
    }

    /// Split `stores` into capacity-feasible owned routes, without dropout.
    ///
    /// Each route is seeded with the first store still unassigned and grown
    /// until nothing more fits. A store whose own demand exceeds capacity ends
    /// up alone on an over-capacity route; `DemandSimulator::simulate_run`
    /// rejects such stores before calling this.
    pub fn partition(&self, stores: &[NodeId]) -> Vec<Route> {
        let mut unassigned: Vec<NodeId> = stores.to_vec();
        let mut routes = Vec::new();

        while !unassigned.is_empty() {
            let seed = unassigned.remove(0);
            let mut nodes = vec![Problem::WAREHOUSE, seed, Problem::WAREHOUSE];
            let mut load = self.demand[seed];

            loop {
                let candidates: Vec<NodeId> = unassigned
                    .iter()
                    .copied()
                    .filter(|&store| load + self.demand[store] <= self.capacity)
                    .collect();

                match self.cheapest_insertion(&nodes, &candidates, 1.0) {
                    Some((store, pos)) => {
                        nodes.insert(pos, store);
                        load += self.demand[store];
                        unassigned.retain(|&s| s != store);
                    }
                    None => break,
                }
            }

            routes.push(self.evaluate(nodes));
        }

        routes
    }

    /// Best `(store, position)` insertion among `candidates`, by weighted time.
    pub fn cheapest_insertion(
        &self,
        nodes: &[NodeId],
        candidates: &[NodeId],
        warehouse_weight: f64,
    ) -> Option<(NodeId, usize)> {
        let mut best: Option<(NodeId, usize)> = None;
        let mut best_delta = f64::INFINITY;

        for &store in candidates {
            for pos in 1..nodes.len() {
                let delta = self.time_model.insertion_delta(
                    nodes,
                    store,
                    pos,
                    self.problem,
                    warehouse_weight,
                );

                if delta < best_delta {
                    best_delta = delta;
                    best = Some((store, pos));
                }
            }
        }

        best
    }

    fn evaluate(&self, nodes: Vec<NodeId>) -> Route {
        Route::evaluate(
            nodes,
            self.demand,
            self.problem,
            &self.time_model,
            &self.cost_model,
            TruckType::Owned,
        )
    }
}
