//! Unit tests for the route time and cost models.

use delivery_routes::config::Config;
use delivery_routes::cost::{CostModel, OwnedBilling, TimeModel};
use delivery_routes::problem::{DayType, DemandEntry, DurationEntry, Problem, RegionColumn};
use delivery_routes::route::TruckType;

/// Travel minutes equal to the Euclidean distance between points.
fn durations_from_points(points: &[(&str, f64, f64)]) -> Vec<DurationEntry> {
    let mut entries = Vec::new();
    for &(a, ax, ay) in points {
        for &(b, bx, by) in points {
            let minutes = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();
            entries.push(DurationEntry::new(a, b, minutes));
        }
    }
    entries
}

/// Creates a warehouse with two stores forming a right triangle.
fn create_test_problem() -> Problem {
    let points = [("Warehouse", 0.0, 0.0), ("A", 10.0, 0.0), ("B", 10.0, 10.0)];

    Problem::new(
        "TriangleProblem",
        "Warehouse",
        &[RegionColumn::new("Only", &["A", "B"])],
        &durations_from_points(&points),
        &[DemandEntry::new("A", 4.0, 3.0), DemandEntry::new("B", 5.0, 2.0)],
    )
    .unwrap()
}

#[test]
fn test_owned_cost_within_shift() {
    let model = CostModel::new(&Config::new());

    assert_eq!(model.owned_billing(120.0), OwnedBilling::Shift);
    assert!((model.owned_cost(120.0) - 300.0).abs() < 1e-9);
    // Shift time is billed pro rata, no rounding
    assert!((model.owned_cost(61.5) - 153.75).abs() < 1e-9);
}

#[test]
fn test_owned_cost_at_shift_boundary_uses_shift_branch() {
    let model = CostModel::new(&Config::new());

    assert_eq!(model.owned_billing(240.0), OwnedBilling::Shift);
    assert!((model.owned_cost(240.0) - 600.0).abs() < 1e-9);
    assert_eq!(model.owned_billing(240.0001), OwnedBilling::Overtime);
}

#[test]
fn test_owned_cost_overtime_rounds_minutes_up() {
    let model = CostModel::new(&Config::new());

    // 10.5 overtime minutes are billed as 11
    let expected = 600.0 + 11.0 * 200.0 / 60.0;
    assert!((model.owned_cost(250.5) - expected).abs() < 1e-9);

    let expected = 600.0 + 60.0 * 200.0 / 60.0;
    assert!((model.owned_cost(300.0) - expected).abs() < 1e-9);
}

#[test]
fn test_leased_cost_per_started_block() {
    let model = CostModel::new(&Config::new());

    assert_eq!(model.leased_cost(100.0), 3000.0);
    assert_eq!(model.leased_cost(240.0), 3000.0);
    assert_eq!(model.leased_cost(240.5), 6000.0);
    assert_eq!(model.leased_cost(600.0), 9000.0);
}

#[test]
fn test_truck_type_cost_dispatch() {
    let model = CostModel::new(&Config::new());

    assert_eq!(TruckType::Owned.cost(90.0, &model), model.owned_cost(90.0));
    assert_eq!(TruckType::Leased.cost(90.0, &model), model.leased_cost(90.0));
}

#[test]
fn test_route_time_includes_unloading_and_traffic() {
    let problem = create_test_problem();
    let config = Config::new();
    let weekday = TimeModel::new(&config, DayType::Weekday);
    let saturday = TimeModel::new(&config, DayType::Saturday);

    let nodes = vec![0, 1, 2, 0];
    let travel = 10.0 + 10.0 + 200.0_f64.sqrt();

    let expected = 2.0 * 4.0 + 1.4 * travel;
    assert!((weekday.route_time(&nodes, &problem) - expected).abs() < 1e-9);

    let expected = 2.0 * 4.0 + 1.2 * travel;
    assert!((saturday.route_time(&nodes, &problem) - expected).abs() < 1e-9);
}

#[test]
fn test_warehouse_weight_scales_only_warehouse_legs() {
    let problem = create_test_problem();
    let model = TimeModel::new(&Config::new(), DayType::Weekday);

    let nodes = vec![0, 1, 2, 0];
    let weighted = model.weighted_time(&nodes, &problem, 0.5);
    let expected = 8.0 + 1.4 * (0.5 * 10.0 + 10.0 + 0.5 * 200.0_f64.sqrt());

    assert!((weighted - expected).abs() < 1e-9);
    assert!(weighted < model.route_time(&nodes, &problem));
}

#[test]
fn test_insertion_delta_matches_full_recalculation() {
    let problem = create_test_problem();
    let model = TimeModel::new(&Config::new(), DayType::Weekday);

    let base = vec![0, 1, 0];
    for pos in 1..base.len() {
        let mut inserted = base.clone();
        inserted.insert(pos, 2);

        let delta = model.insertion_delta(&base, 2, pos, &problem, 0.7);
        let full = model.weighted_time(&inserted, &problem, 0.7)
            - model.weighted_time(&base, &problem, 0.7);

        assert!((delta - full).abs() < 1e-9);
    }
}
