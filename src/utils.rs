//! Reporting and persistence helpers.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::cost::{CostModel, TimeModel};
use crate::dedupe::CandidatePool;
use crate::error::Result;
use crate::plan::{Plan, PlanRow};
use crate::problem::{DayType, NodeId, Problem};
use crate::route::Route;
use crate::simulate::SimulationOutcome;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a plan as JSON rows, one per route.
pub fn save_plan<P: AsRef<Path>>(plan: &Plan, problem: &Problem, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &plan.rows(problem))?;
    Ok(())
}

/// Load a plan saved by [`save_plan`], re-evaluating every route for the day type.
pub fn load_plan<P: AsRef<Path>>(
    path: P,
    problem: &Problem,
    config: &Config,
    day_type: DayType,
) -> Result<Plan> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<PlanRow> = serde_json::from_reader(reader)?;
    plan_from_rows(&rows, problem, config, day_type)
}

/// Rebuild a plan from persisted rows.
pub fn plan_from_rows(
    rows: &[PlanRow],
    problem: &Problem,
    config: &Config,
    day_type: DayType,
) -> Result<Plan> {
    let time_model = TimeModel::new(config, day_type);
    let cost_model = CostModel::new(config);
    let demand = problem.demands.column(day_type);

    let mut routes = Vec::with_capacity(rows.len());
    for row in rows {
        let nodes = row
            .route
            .iter()
            .map(|name| problem.node_id(name))
            .collect::<Result<Vec<NodeId>>>()?;
        routes.push(Route::evaluate(
            nodes,
            demand,
            problem,
            &time_model,
            &cost_model,
            row.truck_type,
        ));
    }

    Ok(Plan::new(routes))
}

/// Persisted form of a candidate route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRow {
    pub route: Vec<String>,
    pub time: f64,
    pub load: f64,
    pub owned_cost: f64,
    pub leased_cost: f64,
}

/// Save the candidate pool, ordered by store set.
pub fn save_candidates<P: AsRef<Path>>(
    pool: &CandidatePool,
    problem: &Problem,
    path: P,
) -> Result<()> {
    let rows: Vec<CandidateRow> = pool
        .routes()
        .into_iter()
        .map(|route| CandidateRow {
            route: route.describe(problem),
            time: route.time,
            load: route.load,
            owned_cost: route.owned_cost,
            leased_cost: route.leased_cost,
        })
        .collect();

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Persisted form of a simulation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRow {
    pub run: String,
    pub total_cost: f64,
    pub leased_routes: usize,
    pub added_routes: usize,
}

/// Save one row per simulated run.
pub fn save_outcomes<P: AsRef<Path>>(outcomes: &[SimulationOutcome], path: P) -> Result<()> {
    let rows: Vec<OutcomeRow> = outcomes
        .iter()
        .map(|o| OutcomeRow {
            run: o.run.clone(),
            total_cost: o.total_cost,
            leased_routes: o.leased_routes,
            added_routes: o.added_routes,
        })
        .collect();

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Value at percentile `p` (0 to 100) of sorted data, nearest rank.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (p / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Aggregate statistics over simulated runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub runs: usize,
    pub mean_cost: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    pub lower_cost: f64,
    pub upper_cost: f64,
    pub mean_leased_routes: f64,
    pub mean_added_routes: f64,
    pub repaired_runs: usize,
}

impl SimulationSummary {
    /// Summarise outcomes; the cost interval spans the 2.5th to 97.5th percentile.
    pub fn from_outcomes(outcomes: &[SimulationOutcome]) -> Self {
        let runs = outcomes.len();
        let mut costs: Vec<f64> = outcomes.iter().map(|o| o.total_cost).collect();
        costs.sort_by(|a, b| a.total_cmp(b));

        SimulationSummary {
            runs,
            mean_cost: mean(costs.iter().copied(), runs),
            min_cost: costs.first().copied().unwrap_or(0.0),
            max_cost: costs.last().copied().unwrap_or(0.0),
            lower_cost: percentile(&costs, 2.5),
            upper_cost: percentile(&costs, 97.5),
            mean_leased_routes: mean(outcomes.iter().map(|o| o.leased_routes as f64), runs),
            mean_added_routes: mean(outcomes.iter().map(|o| o.added_routes as f64), runs),
            repaired_runs: outcomes.iter().filter(|o| o.repaired_routes > 0).count(),
        }
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Simulation Statistics:
- Runs: {}
- Mean Cost: {:.2}
- Cost Range: {:.2} .. {:.2}
- 95% Cost Interval: {:.2} .. {:.2}
- Mean Leased Routes: {:.2}
- Mean Added Routes: {:.2}
- Runs Needing Repair: {}",
            self.runs,
            self.mean_cost,
            self.min_cost,
            self.max_cost,
            self.lower_cost,
            self.upper_cost,
            self.mean_leased_routes,
            self.mean_added_routes,
            self.repaired_runs
        )
    }
}

/// Print a plan to the console.
pub fn print_plan(plan: &Plan, problem: &Problem) {
    println!("Plan for {}", problem.name);
    println!("Total Cost: {:.2}", plan.total_cost());
    println!(
        "Routes: {} ({} owned, {} leased)",
        plan.get_route_count(),
        plan.owned_count(),
        plan.leased_count()
    );
    println!();

    for row in plan.rows(problem) {
        println!(
            "{} [{}] {:.2}: {}",
            row.route_id,
            row.truck_type,
            row.cost,
            row.route.join(" -> ")
        );
    }
    println!();
}
