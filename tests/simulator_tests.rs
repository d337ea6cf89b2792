//! Tests for replaying a fixed plan under demand realizations.

use delivery_routes::config::Config;
use delivery_routes::cost::{CostModel, TimeModel};
use delivery_routes::demand::DemandRealization;
use delivery_routes::error::{Error, Stage};
use delivery_routes::plan::Plan;
use delivery_routes::problem::{DayType, DemandEntry, DurationEntry, NodeId, Problem, RegionColumn};
use delivery_routes::route::{Route, TruckType};
use delivery_routes::simulate::DemandSimulator;

/// Stores on a line: A 5 minutes out, B 20 and C 40, each expecting 4 pallets.
fn create_test_problem() -> Problem {
    let points = [("Warehouse", 0.0), ("A", 5.0), ("B", 20.0), ("C", 40.0)];
    let mut durations = Vec::new();
    for &(a, ax) in &points {
        for &(b, bx) in &points {
            durations.push(DurationEntry::new(a, b, f64::abs(ax - bx)));
        }
    }

    Problem::new(
        "SimulationProblem",
        "Warehouse",
        &[RegionColumn::new("Line", &["A", "B", "C"])],
        &durations,
        &[
            DemandEntry::new("A", 4.0, 4.0),
            DemandEntry::new("B", 4.0, 4.0),
            DemandEntry::new("C", 4.0, 4.0),
        ],
    )
    .unwrap()
}

fn create_plan(problem: &Problem, config: &Config, routes: Vec<Vec<NodeId>>) -> Plan {
    let time_model = TimeModel::new(config, DayType::Weekday);
    let cost_model = CostModel::new(config);
    let demand = problem.demands.column(DayType::Weekday);

    Plan::new(
        routes
            .into_iter()
            .map(|nodes| {
                Route::evaluate(nodes, demand, problem, &time_model, &cost_model, TruckType::Owned)
            })
            .collect(),
    )
}

fn realization(problem: &Problem, run: &str, demands: &[(&str, f64)]) -> DemandRealization {
    DemandRealization::from_named(run, problem, DayType::Weekday, demands).unwrap()
}

#[test]
fn test_feasible_realization_keeps_plan() {
    let problem = create_test_problem();
    let config = Config::new().with_trucks(1).with_shifts_per_truck(2);
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 0], vec![0, 2, 0]]);
    let stores = vec![1, 2];

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 10.0), ("B", 8.0)]);
    let outcome = simulator.simulate_run(&plan, &run).unwrap();

    assert_eq!(outcome.run, "Run1");
    assert_eq!(outcome.repaired_routes, 0);
    assert_eq!(outcome.leased_routes, 0);
    assert_eq!(outcome.added_routes, 0);
    assert!(outcome.plan.is_partition_of(&stores));
    assert!(outcome.plan.routes.iter().all(|r| r.truck == TruckType::Owned));

    let expected: f64 = plan.routes.iter().map(|r| r.owned_cost).sum();
    assert!((outcome.total_cost - expected).abs() < 1e-9);
    assert_eq!(outcome.plan.routes[0].load, 10.0);
}

#[test]
fn test_repair_drops_first_store_when_nearer() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 8.0), ("B", 5.0), ("C", 5.0)]);
    let outcome = simulator.simulate_run(&plan, &run).unwrap();

    assert_eq!(outcome.repaired_routes, 1);
    assert_eq!(outcome.added_routes, 1);
    assert_eq!(outcome.plan.routes[0].nodes, vec![0, 2, 3, 0]);
    assert_eq!(outcome.plan.routes[0].load, 10.0);
    assert_eq!(outcome.plan.routes[1].nodes, vec![0, 1, 0]);
    assert!(outcome.plan.is_partition_of(&problem.stores()));
}

#[test]
fn test_repair_drops_last_store_when_nearer() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 3, 2, 1, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 5.0), ("B", 5.0), ("C", 8.0)]);
    let realized = plan.routes[0].with_demand(&run.demand);
    let (repaired, dropped) = simulator.repair(&realized, &run).unwrap();

    assert_eq!(dropped, vec![1]);
    assert_eq!(repaired.nodes, vec![0, 3, 2, 0]);
    assert_eq!(repaired.truck, TruckType::Owned);
    assert!(!repaired.exceeds_capacity(config.truck_capacity));
}

#[test]
fn test_repair_removes_several_stores() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 9.0), ("B", 9.0), ("C", 9.0)]);
    let outcome = simulator.simulate_run(&plan, &run).unwrap();

    assert_eq!(outcome.plan.routes[0].nodes, vec![0, 3, 0]);
    // A and B no longer fit together either
    assert_eq!(outcome.added_routes, 2);
    assert!(outcome.plan.is_partition_of(&problem.stores()));
    for route in &outcome.plan.routes {
        assert!(route.load <= config.truck_capacity);
    }
}

#[test]
fn test_single_store_over_capacity_is_unrepairable() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 0], vec![0, 2, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run7", &[("A", 20.0)]);
    let err = simulator.simulate_run(&plan, &run).unwrap_err();

    assert_eq!(err.stage(), Stage::Simulation);
    match err {
        Error::UnrepairableRealization { run, store, demand } => {
            assert_eq!(run, "Run7");
            assert_eq!(store, "A");
            assert_eq!(demand, 20.0);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_removed_store_over_capacity_is_unrepairable() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 0], vec![0, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 20.0), ("B", 3.0)]);
    let err = simulator.simulate_run(&plan, &run).unwrap_err();

    assert!(matches!(err, Error::UnrepairableRealization { ref store, .. } if store == "A"));
}

#[test]
fn test_owned_overflow_is_leased() {
    let problem = create_test_problem();
    let config = Config::new().with_trucks(1).with_shifts_per_truck(1);
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 0], vec![0, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = DemandRealization::from_expected(&problem, DayType::Weekday);
    let outcome = simulator.simulate_run(&plan, &run).unwrap();

    // The route to C is the more expensive one to own
    assert_eq!(outcome.leased_routes, 1);
    assert_eq!(outcome.plan.routes[0].truck, TruckType::Owned);
    assert_eq!(outcome.plan.routes[1].truck, TruckType::Leased);
    let expected = plan.routes[0].owned_cost + plan.routes[1].leased_cost;
    assert!((outcome.total_cost - expected).abs() < 1e-9);
}

#[test]
fn test_lease_overflow_within_limit_is_noop() {
    let problem = create_test_problem();
    let config = Config::new().with_trucks(1).with_shifts_per_truck(2);
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 0], vec![0, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let mut routes = plan.routes.clone();
    simulator.lease_overflow(&mut routes);

    assert_eq!(routes, plan.routes);
}

#[test]
fn test_simulation_leaves_plan_untouched_and_is_repeatable() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);
    let before = plan.clone();

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let run = realization(&problem, "Run1", &[("A", 9.0), ("B", 6.0), ("C", 6.0)]);

    let first = simulator.simulate_run(&plan, &run).unwrap();
    let second = simulator.simulate_run(&plan, &run).unwrap();

    assert_eq!(plan, before);
    assert_eq!(first.plan, second.plan);
    assert_eq!(first.total_cost, second.total_cost);
}

#[test]
fn test_outcomes_follow_realization_order() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);

    let realizations: Vec<DemandRealization> = (1..=5)
        .map(|i| {
            let pallets = 2.0 + i as f64;
            realization(&problem, &format!("Run{}", i), &[("B", pallets)])
        })
        .collect();

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let outcomes = simulator.simulate(&plan, &realizations).unwrap();

    let runs: Vec<&str> = outcomes.iter().map(|o| o.run.as_str()).collect();
    assert_eq!(runs, vec!["Run1", "Run2", "Run3", "Run4", "Run5"]);
    for outcome in &outcomes {
        assert!(outcome.plan.is_partition_of(&problem.stores()));
        assert!(outcome.plan.routes.iter().all(|r| r.load <= config.truck_capacity));
    }
    // 4 + 7 + 4 = 15 pallets still fits
    assert_eq!(outcomes[4].repaired_routes, 0);
}

#[test]
fn test_realization_with_wrong_length_is_rejected() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);

    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);
    let short = DemandRealization::new("Run1", vec![0.0, 4.0, 4.0]);
    let err = simulator.simulate_run(&plan, &short).unwrap_err();

    assert_eq!(err.stage(), Stage::Simulation);
    assert!(matches!(err, Error::InvalidRealization { ref run, .. } if run == "Run1"));

    // The parallel entry point reports the same error instead of panicking
    let err = simulator.simulate(&plan, &[short]).unwrap_err();
    assert!(matches!(err, Error::InvalidRealization { .. }));
}

#[test]
fn test_realization_with_invalid_values_is_rejected() {
    let problem = create_test_problem();
    let config = Config::new();
    let plan = create_plan(&problem, &config, vec![vec![0, 1, 2, 3, 0]]);
    let simulator = DemandSimulator::new(&problem, &config, DayType::Weekday);

    for value in [f64::NAN, -1.0, f64::INFINITY] {
        let run = realization(&problem, "Run2", &[("B", value)]);
        let err = simulator.simulate_run(&plan, &run).unwrap_err();

        assert_eq!(err.stage(), Stage::Simulation);
        match err {
            Error::InvalidRealization { run, reason } => {
                assert_eq!(run, "Run2");
                assert!(reason.contains("'B'"), "{}", reason);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
