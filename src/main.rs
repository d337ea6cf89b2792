//! Command-line front end: plan routes for a scenario and simulate them.

use clap::{Parser, ValueEnum};
use delivery_routes::config::Config;
use delivery_routes::demand::{
    BootstrapSampler, DemandRealization, DemandSampler, PerturbationSampler,
};
use delivery_routes::problem::{DayType, Scenario};
use delivery_routes::utils::{
    format_duration, print_plan, save_candidates, save_outcomes, save_plan, SimulationSummary,
};
use delivery_routes::RoutePlanner;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DayArg {
    Weekday,
    Saturday,
}

impl From<DayArg> for DayType {
    fn from(day: DayArg) -> Self {
        match day {
            DayArg::Weekday => DayType::Weekday,
            DayArg::Saturday => DayType::Saturday,
        }
    }
}

/// Plan next-day delivery routes and validate them against random demand.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Scenario JSON with regions, travel durations and demand
    #[arg(long)]
    scenario: PathBuf,

    /// Day type to plan for
    #[arg(long, value_enum, default_value = "weekday")]
    day_type: DayArg,

    /// Number of demand realizations to simulate
    #[arg(long, default_value_t = 1000)]
    runs: usize,

    /// Base random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Dropout rate for candidate generation (repeatable)
    #[arg(long = "dropout")]
    dropouts: Vec<f64>,

    /// Warehouse leg weight for candidate generation (repeatable)
    #[arg(long = "warehouse-weight")]
    warehouse_weights: Vec<f64>,

    /// Number of owned trucks
    #[arg(long, default_value_t = 12)]
    trucks: usize,

    /// Shifts per owned truck
    #[arg(long, default_value_t = 2)]
    shifts: usize,

    /// Stop selection after this many branch-and-bound nodes
    #[arg(long)]
    node_limit: Option<usize>,

    /// Where to write the selected plan
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the per-run simulation outcomes
    #[arg(long)]
    outcomes: Option<PathBuf>,

    /// Where to write the deduplicated candidate pool
    #[arg(long)]
    candidates: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let day_type = DayType::from(args.day_type);

    info!("Loading scenario from: {}", args.scenario.display());
    let scenario = Scenario::from_file(&args.scenario)?;
    let problem = scenario.to_problem()?;
    info!(
        "Loaded scenario: {} with {} stores in {} regions",
        problem.name,
        problem.get_store_count(),
        problem.regions.len()
    );

    let mut config = Config::new()
        .with_trucks(args.trucks)
        .with_shifts_per_truck(args.shifts)
        .with_seed(args.seed);
    if !args.dropouts.is_empty() {
        config = config.with_dropout_rates(args.dropouts.clone());
    }
    if !args.warehouse_weights.is_empty() {
        config = config.with_warehouse_weights(args.warehouse_weights.clone());
    }
    if let Some(limit) = args.node_limit {
        config = config.with_node_limit(limit);
    }

    // Realizations draw from a stream of their own, apart from route generation.
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    rng.set_stream(u64::MAX);
    let realizations: Vec<DemandRealization> = if scenario.history.is_empty() {
        info!("No demand history, perturbing mean demand");
        PerturbationSampler::default().sample(&problem, day_type, args.runs, &mut rng)?
    } else {
        BootstrapSampler::new(&problem, &scenario.history)?.sample(
            &problem,
            day_type,
            args.runs,
            &mut rng,
        )?
    };

    let planner = RoutePlanner::new(problem, config);
    let report = planner.run(day_type, &realizations)?;

    println!("Planning completed in {}", format_duration(report.run_time));
    println!("Candidate routes: {}", report.candidates.len());
    println!(
        "Selection objective: {:.2}{}",
        report.selection.objective,
        if report.selection.optimal { "" } else { " (node limit reached)" }
    );
    print_plan(&report.selection.plan, &planner.problem);
    println!("{}", SimulationSummary::from_outcomes(&report.outcomes).format());

    if let Some(path) = &args.output {
        info!("Saving plan to: {}", path.display());
        save_plan(&report.selection.plan, &planner.problem, path)?;
    }
    if let Some(path) = &args.candidates {
        info!("Saving candidate routes to: {}", path.display());
        save_candidates(&report.candidates, &planner.problem, path)?;
    }
    if let Some(path) = &args.outcomes {
        info!("Saving simulation outcomes to: {}", path.display());
        save_outcomes(&report.outcomes, path)?;
    }

    Ok(())
}
