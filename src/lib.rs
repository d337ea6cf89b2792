//! # Delivery routes
//!
//! Plans next-day delivery routes from a single warehouse to a set of stores
//! and validates the plan against random demand.
//!
//! The pipeline has three stages:
//!
//! 1. [`builder::RouteBuilder`] grows a large pool of capacity-feasible
//!    candidate routes per region by cheapest insertion, diversified by a
//!    sweep over dropout rates and warehouse leg weights. The pool is then
//!    collapsed to one route per store set by [`dedupe::CandidatePool`].
//! 2. [`select::RouteSelector`] picks a minimum-cost subset of candidates
//!    covering each store exactly once within the owned fleet size.
//! 3. [`simulate::DemandSimulator`] replays the selected plan under demand
//!    realizations, repairing overloaded routes and leasing trucks for any
//!    work the owned fleet cannot absorb.

pub mod builder;
pub mod config;
pub mod cost;
pub mod dedupe;
pub mod demand;
pub mod error;
pub mod plan;
pub mod problem;
pub mod route;
pub mod select;
pub mod simulate;
pub mod utils;

use crate::builder::RouteBuilder;
use crate::config::Config;
use crate::dedupe::CandidatePool;
use crate::demand::DemandRealization;
use crate::error::Result;
use crate::plan::Plan;
use crate::problem::{DayType, Problem};
use crate::route::Route;
use crate::select::{BranchAndBound, RouteSelector, Selection};
use crate::simulate::{DemandSimulator, SimulationOutcome};

use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Everything produced by one pass of the pipeline.
#[derive(Debug, Clone)]
pub struct PlanningReport {
    /// Deduplicated candidate routes handed to selection
    pub candidates: CandidatePool,
    pub selection: Selection,
    pub outcomes: Vec<SimulationOutcome>,
    pub run_time: Duration,
}

/// One builder invocation of the parameter sweep.
#[derive(Debug, Clone, Copy)]
struct BuildJob {
    region: usize,
    dropout: f64,
    warehouse_weight: f64,
    stream: u64,
}

/// Orchestrates candidate generation, selection and simulation.
pub struct RoutePlanner {
    pub problem: Problem,
    pub config: Config,
}

impl RoutePlanner {
    /// Create a planner for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        RoutePlanner { problem, config }
    }

    /// Run the builder for every region, dropout rate and warehouse weight.
    ///
    /// Each invocation draws from its own ChaCha stream of the base seed, so
    /// the result does not depend on how the invocations are scheduled.
    pub fn generate_routes(&self, day_type: DayType) -> Vec<Route> {
        let demand = self.problem.demands.column(day_type);
        let builder = RouteBuilder::new(&self.problem, demand, &self.config, day_type);

        let mut jobs = Vec::new();
        for region in 0..self.problem.regions.len() {
            for &dropout in &self.config.dropout_rates {
                for &warehouse_weight in &self.config.warehouse_weights {
                    jobs.push(BuildJob {
                        region,
                        dropout,
                        warehouse_weight,
                        stream: jobs.len() as u64,
                    });
                }
            }
        }

        jobs.par_iter()
            .flat_map_iter(|job| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
                rng.set_stream(job.stream);
                let stores = &self.problem.regions[job.region].stores;
                builder.build(stores, job.dropout, job.warehouse_weight, &mut rng)
            })
            .collect()
    }

    /// Generate and deduplicate the candidate pool.
    pub fn generate_candidates(&self, day_type: DayType) -> CandidatePool {
        let routes = self.generate_routes(day_type);
        let generated = routes.len();
        let pool: CandidatePool = routes.into_iter().collect();

        info!(
            "{} candidate routes generated, {} after removing duplicates",
            generated,
            pool.len()
        );

        pool
    }

    /// Select the plan from a candidate pool.
    pub fn select_routes(&self, pool: &CandidatePool) -> Result<Selection> {
        let candidates: Vec<Route> = pool.routes().into_iter().cloned().collect();
        let solver = BranchAndBound::with_node_limit(self.config.node_limit);
        let selector = RouteSelector::new(solver, self.config.route_penalty);

        selector.select(
            &candidates,
            &self.problem.stores(),
            &self.problem,
            self.config.trucks,
            self.config.shifts_per_truck,
        )
    }

    /// Stress a plan with demand realizations.
    pub fn simulate(
        &self,
        plan: &Plan,
        realizations: &[DemandRealization],
        day_type: DayType,
    ) -> Result<Vec<SimulationOutcome>> {
        let simulator = DemandSimulator::new(&self.problem, &self.config, day_type);
        let outcomes = simulator.simulate(plan, realizations)?;
        info!("simulated {} demand realizations", outcomes.len());
        Ok(outcomes)
    }

    /// Run the full pipeline for a day type.
    pub fn run(
        &self,
        day_type: DayType,
        realizations: &[DemandRealization],
    ) -> Result<PlanningReport> {
        let start_time = Instant::now();

        let pool = self.generate_candidates(day_type);
        let selection = self.select_routes(&pool)?;
        let outcomes = self.simulate(&selection.plan, realizations, day_type)?;

        Ok(PlanningReport {
            candidates: pool,
            selection,
            outcomes,
            run_time: start_time.elapsed(),
        })
    }
}
