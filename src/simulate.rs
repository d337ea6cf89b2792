//! Re-validation of a fixed plan against random demand realizations.

use crate::builder::RouteBuilder;
use crate::config::Config;
use crate::cost::{CostModel, TimeModel};
use crate::demand::DemandRealization;
use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::problem::{DayType, NodeId, Problem};
use crate::route::{Route, TruckType};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of stressing a plan with one realization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Run identifier of the realization
    pub run: String,
    /// Cost of every route in the modified plan
    pub total_cost: f64,
    /// Routes driven by leased trucks
    pub leased_routes: usize,
    /// Routes beyond the size of the original plan
    pub added_routes: usize,
    /// Selected routes that had stores removed
    pub repaired_routes: usize,
    /// The modified plan
    pub plan: Plan,
}

/// Applies each realization to its own copy of a plan, repairs capacity
/// overflows and leases whatever the owned fleet cannot run.
pub struct DemandSimulator<'a> {
    problem: &'a Problem,
    config: &'a Config,
    day_type: DayType,
    time_model: TimeModel,
    cost_model: CostModel,
}

impl<'a> DemandSimulator<'a> {
    pub fn new(problem: &'a Problem, config: &'a Config, day_type: DayType) -> Self {
        DemandSimulator {
            problem,
            config,
            day_type,
            time_model: TimeModel::new(config, day_type),
            cost_model: CostModel::new(config),
        }
    }

    /// Simulate every realization in parallel. Fails on the first run that cannot be repaired.
    pub fn simulate(
        &self,
        plan: &Plan,
        realizations: &[DemandRealization],
    ) -> Result<Vec<SimulationOutcome>> {
        realizations
            .par_iter()
            .map(|realization| self.simulate_run(plan, realization))
            .collect()
    }

    /// Simulate a single realization.
    pub fn simulate_run(
        &self,
        plan: &Plan,
        realization: &DemandRealization,
    ) -> Result<SimulationOutcome> {
        self.validate(realization)?;

        let demand = realization.demand.as_slice();
        let mut routes: Vec<Route> = Vec::with_capacity(plan.get_route_count());
        let mut removed: Vec<NodeId> = Vec::new();
        let mut repaired_routes = 0;

        for route in &plan.routes {
            let realized = route.with_demand(demand);
            if realized.exceeds_capacity(self.config.truck_capacity) {
                let (repaired, dropped) = self.repair(&realized, realization)?;
                debug!(
                    "{}: route {:?} over capacity, removed {:?}",
                    realization.run, route.nodes, dropped
                );
                routes.push(repaired);
                removed.extend(dropped);
                repaired_routes += 1;
            } else {
                routes.push(realized);
            }
        }

        for &store in &removed {
            if demand[store] > self.config.truck_capacity {
                return Err(self.unrepairable(realization, store));
            }
        }

        let builder = RouteBuilder::new(self.problem, demand, self.config, self.day_type);
        routes.extend(builder.partition(&removed));

        self.lease_overflow(&mut routes);

        let plan_out = Plan::new(routes);
        Ok(SimulationOutcome {
            run: realization.run.clone(),
            total_cost: plan_out.total_cost(),
            leased_routes: plan_out.leased_count(),
            added_routes: plan_out.get_route_count().saturating_sub(plan.get_route_count()),
            repaired_routes,
            plan: plan_out,
        })
    }

    /// Drop stores from the end nearer the warehouse until the route fits.
    ///
    /// Returns the shortened route, now on an owned truck, and the dropped stores.
    pub fn repair(
        &self,
        route: &Route,
        realization: &DemandRealization,
    ) -> Result<(Route, Vec<NodeId>)> {
        let demand = realization.demand.as_slice();
        let capacity = self.config.truck_capacity;
        let mut nodes = route.nodes.clone();
        let mut load = route.load;
        let mut dropped = Vec::new();

        while load > capacity {
            let last = nodes.len() - 2;
            if last == 1 {
                return Err(self.unrepairable(realization, nodes[1]));
            }

            let to_first = self.problem.get_duration(Problem::WAREHOUSE, nodes[1]);
            let from_last = self.problem.get_duration(nodes[last], Problem::WAREHOUSE);
            let pos = if to_first < from_last { 1 } else { last };

            let store = nodes.remove(pos);
            load -= demand[store];
            dropped.push(store);
        }

        let repaired = Route::evaluate(
            nodes,
            demand,
            self.problem,
            &self.time_model,
            &self.cost_model,
            TruckType::Owned,
        );

        Ok((repaired, dropped))
    }

    /// Move the most expensive owned routes to leased trucks until the owned fleet suffices.
    pub fn lease_overflow(&self, routes: &mut [Route]) {
        let limit = self.config.owned_route_limit();

        loop {
            let owned = routes.iter().filter(|r| r.truck == TruckType::Owned).count();
            if owned <= limit {
                break;
            }

            let most_expensive = routes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.truck == TruckType::Owned)
                .max_by(|(_, a), (_, b)| a.owned_cost.total_cmp(&b.owned_cost))
                .map(|(id, _)| id);

            match most_expensive {
                Some(id) => routes[id] = routes[id].with_truck(TruckType::Leased),
                None => break,
            }
        }
    }

    /// One finite, non-negative value per node.
    fn validate(&self, realization: &DemandRealization) -> Result<()> {
        let expected = self.problem.nodes.len();
        if realization.demand.len() != expected {
            return Err(Error::InvalidRealization {
                run: realization.run.clone(),
                reason: format!(
                    "{} demand values for {} nodes",
                    realization.demand.len(),
                    expected
                ),
            });
        }

        let invalid = realization
            .demand
            .iter()
            .position(|&value| !value.is_finite() || value < 0.0);
        if let Some(id) = invalid {
            return Err(Error::InvalidRealization {
                run: realization.run.clone(),
                reason: format!(
                    "demand of '{}' is {}",
                    self.problem.node_name(id),
                    realization.demand[id]
                ),
            });
        }

        Ok(())
    }

    fn unrepairable(&self, realization: &DemandRealization, store: NodeId) -> Error {
        Error::UnrepairableRealization {
            run: realization.run.clone(),
            store: self.problem.node_name(store).to_string(),
            demand: realization.demand[store],
        }
    }
}
