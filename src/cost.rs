//! Route time and monetary cost models.

use crate::config::Config;
use crate::problem::{DayType, NodeId, Problem};
use serde::{Deserialize, Serialize};

/// Computes drive plus unload time of a node sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeModel {
    /// Minutes spent at each store
    pub unloading_minutes: f64,
    /// Multiplier applied to every travel leg
    pub traffic: f64,
}

impl TimeModel {
    /// Create the time model for a day type.
    pub fn new(config: &Config, day_type: DayType) -> Self {
        let traffic = match day_type {
            DayType::Weekday => config.weekday_traffic,
            DayType::Saturday => config.saturday_traffic,
        };

        TimeModel {
            unloading_minutes: config.unloading_minutes,
            traffic,
        }
    }

    /// Travel time of a single leg, with legs touching the warehouse scaled by `warehouse_weight`.
    pub fn leg_time(
        &self,
        from: NodeId,
        to: NodeId,
        problem: &Problem,
        warehouse_weight: f64,
    ) -> f64 {
        let travel = self.traffic * problem.get_duration(from, to);
        if from == Problem::WAREHOUSE || to == Problem::WAREHOUSE {
            travel * warehouse_weight
        } else {
            travel
        }
    }

    /// Weighted time of a full node sequence, warehouse at both ends.
    pub fn weighted_time(
        &self,
        nodes: &[NodeId],
        problem: &Problem,
        warehouse_weight: f64,
    ) -> f64 {
        if nodes.len() < 2 {
            return 0.0;
        }

        let unloading = self.unloading_minutes * (nodes.len() - 2) as f64;
        let travel: f64 = nodes
            .windows(2)
            .map(|leg| self.leg_time(leg[0], leg[1], problem, warehouse_weight))
            .sum();

        unloading + travel
    }

    /// Actual time of a node sequence.
    pub fn route_time(&self, nodes: &[NodeId], problem: &Problem) -> f64 {
        self.weighted_time(nodes, problem, 1.0)
    }

    /// Change in weighted time when `store` is inserted before position `pos`.
    pub fn insertion_delta(
        &self,
        nodes: &[NodeId],
        store: NodeId,
        pos: usize,
        problem: &Problem,
        warehouse_weight: f64,
    ) -> f64 {
        let prev = nodes[pos - 1];
        let next = nodes[pos];

        let old_leg = self.leg_time(prev, next, problem, warehouse_weight);
        let new_legs = self.leg_time(prev, store, problem, warehouse_weight)
            + self.leg_time(store, next, problem, warehouse_weight);

        self.unloading_minutes + new_legs - old_leg
    }
}

/// How an owned-truck route is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedBilling {
    /// Fits inside one shift, billed pro rata
    Shift,
    /// Runs past the shift, billed a full shift plus overtime minutes
    Overtime,
}

/// Monetary cost of owned and leased routes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostModel {
    pub shift_minutes: f64,
    pub shift_rate: f64,
    pub overtime_rate: f64,
    pub leased_block_minutes: f64,
    pub leased_block_rate: f64,
}

impl CostModel {
    pub fn new(config: &Config) -> Self {
        CostModel {
            shift_minutes: config.shift_minutes,
            shift_rate: config.shift_rate,
            overtime_rate: config.overtime_rate,
            leased_block_minutes: config.leased_block_minutes,
            leased_block_rate: config.leased_block_rate,
        }
    }

    /// Billing branch for an owned route of the given length.
    pub fn owned_billing(&self, time: f64) -> OwnedBilling {
        if time <= self.shift_minutes {
            OwnedBilling::Shift
        } else {
            OwnedBilling::Overtime
        }
    }

    /// Cost of running a route of `time` minutes on an owned truck.
    pub fn owned_cost(&self, time: f64) -> f64 {
        match self.owned_billing(time) {
            OwnedBilling::Shift => time * self.shift_rate / 60.0,
            OwnedBilling::Overtime => {
                let shift = self.shift_minutes * self.shift_rate / 60.0;
                // Overtime is billed in whole minutes.
                let overtime_minutes = (time - self.shift_minutes).ceil();
                shift + overtime_minutes * self.overtime_rate / 60.0
            }
        }
    }

    /// Cost of running a route of `time` minutes on a leased truck.
    pub fn leased_cost(&self, time: f64) -> f64 {
        (time / self.leased_block_minutes).ceil() * self.leased_block_rate
    }
}
