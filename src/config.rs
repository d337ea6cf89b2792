//! Configuration parameters for route generation, selection and simulation.

use serde::{Deserialize, Serialize};

/// Configuration settings for the delivery route planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pallets a single truck can carry
    pub truck_capacity: f64,
    /// Minutes spent unloading at each store
    pub unloading_minutes: f64,
    /// Length of one shift in minutes
    pub shift_minutes: f64,
    /// Hourly rate of an owned truck within a shift
    pub shift_rate: f64,
    /// Hourly rate of an owned truck after the shift ends
    pub overtime_rate: f64,
    /// Billing block of a leased truck in minutes
    pub leased_block_minutes: f64,
    /// Price of one leased billing block
    pub leased_block_rate: f64,
    /// Fixed penalty added to every selected route in the objective
    pub route_penalty: f64,
    /// Number of owned trucks
    pub trucks: usize,
    /// Number of shifts each owned truck can run per day
    pub shifts_per_truck: usize,
    /// Traffic multiplier applied to travel legs on weekdays
    pub weekday_traffic: f64,
    /// Traffic multiplier applied to travel legs on Saturdays
    pub saturday_traffic: f64,
    /// Dropout rates swept during candidate generation
    pub dropout_rates: Vec<f64>,
    /// Warehouse leg weights swept during candidate generation
    pub warehouse_weights: Vec<f64>,
    /// Base seed for every random stream
    pub seed: u64,
    /// Optional cap on branch-and-bound nodes explored during selection
    pub node_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            truck_capacity: 16.0,
            unloading_minutes: 4.0,
            shift_minutes: 240.0,
            shift_rate: 150.0,
            overtime_rate: 200.0,
            leased_block_minutes: 240.0,
            leased_block_rate: 3000.0,
            route_penalty: 100.0,
            trucks: 12,
            shifts_per_truck: 2,
            weekday_traffic: 1.4,
            saturday_traffic: 1.2,
            dropout_rates: vec![0.0],
            warehouse_weights: vec![1.0],
            seed: 0,
            node_limit: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the truck capacity in pallets.
    pub fn with_truck_capacity(mut self, capacity: f64) -> Self {
        self.truck_capacity = capacity;
        self
    }

    /// Set the unloading time per stop.
    pub fn with_unloading_minutes(mut self, minutes: f64) -> Self {
        self.unloading_minutes = minutes;
        self
    }

    /// Set the owned fleet size.
    pub fn with_trucks(mut self, trucks: usize) -> Self {
        self.trucks = trucks;
        self
    }

    /// Set the number of shifts per owned truck.
    pub fn with_shifts_per_truck(mut self, shifts: usize) -> Self {
        self.shifts_per_truck = shifts;
        self
    }

    /// Set the per-route selection penalty.
    pub fn with_route_penalty(mut self, penalty: f64) -> Self {
        self.route_penalty = penalty;
        self
    }

    /// Set the traffic multipliers for weekdays and Saturdays.
    pub fn with_traffic(mut self, weekday: f64, saturday: f64) -> Self {
        self.weekday_traffic = weekday;
        self.saturday_traffic = saturday;
        self
    }

    /// Set the dropout rates swept during generation.
    pub fn with_dropout_rates(mut self, rates: Vec<f64>) -> Self {
        self.dropout_rates = rates;
        self
    }

    /// Set the warehouse weights swept during generation.
    pub fn with_warehouse_weights(mut self, weights: Vec<f64>) -> Self {
        self.warehouse_weights = weights;
        self
    }

    /// Set the base random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the branch-and-bound node limit.
    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Maximum number of owned routes a day can run.
    pub fn owned_route_limit(&self) -> usize {
        self.trucks * self.shifts_per_truck
    }
}
