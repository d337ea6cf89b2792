//! Random demand realizations used to stress a fixed plan.

use crate::error::{Error, Result};
use crate::problem::{DayType, NodeId, Problem};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// One realization of demand over every node, indexed by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRealization {
    pub run: String,
    pub demand: Vec<f64>,
}

impl DemandRealization {
    pub fn new(run: &str, demand: Vec<f64>) -> Self {
        DemandRealization {
            run: run.to_string(),
            demand,
        }
    }

    /// Realization equal to the expected demand of the day type.
    pub fn from_expected(problem: &Problem, day_type: DayType) -> Self {
        DemandRealization::new("Expected", problem.demands.column(day_type).to_vec())
    }

    /// Realization from `(store name, pallets)` pairs; unlisted stores take their expected demand.
    pub fn from_named(
        run: &str,
        problem: &Problem,
        day_type: DayType,
        demands: &[(&str, f64)],
    ) -> Result<Self> {
        let mut demand = problem.demands.column(day_type).to_vec();
        for &(name, value) in demands {
            demand[problem.node_id(name)?] = value;
        }
        Ok(DemandRealization::new(run, demand))
    }
}

/// Historical daily observations for one store and day type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub store: String,
    pub day_type: DayType,
    pub observations: Vec<f64>,
}

/// Source of independent demand realizations.
pub trait DemandSampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        day_type: DayType,
        runs: usize,
        rng: &mut R,
    ) -> Result<Vec<DemandRealization>>;
}

/// Resamples each store's past demand with replacement.
#[derive(Debug, Clone)]
pub struct BootstrapSampler {
    weekday: Vec<Vec<f64>>,
    saturday: Vec<Vec<f64>>,
}

impl BootstrapSampler {
    /// Index the history by node; every store needs at least one observation per day type.
    pub fn new(problem: &Problem, history: &[HistoryEntry]) -> Result<Self> {
        let mut weekday = vec![Vec::new(); problem.nodes.len()];
        let mut saturday = vec![Vec::new(); problem.nodes.len()];

        for entry in history {
            let Ok(id) = problem.node_id(&entry.store) else {
                continue;
            };
            let column = match entry.day_type {
                DayType::Weekday => &mut weekday[id],
                DayType::Saturday => &mut saturday[id],
            };
            column.extend(entry.observations.iter().copied());
        }

        let columns = [(DayType::Weekday, &weekday), (DayType::Saturday, &saturday)];
        for store in problem.stores() {
            for (day_type, column) in columns {
                if column[store].is_empty() {
                    return Err(Error::MissingDemand {
                        store: problem.node_name(store).to_string(),
                        column: format!("{} history", day_type.label()),
                    });
                }
            }
        }

        Ok(BootstrapSampler { weekday, saturday })
    }

    fn observations(&self, store: NodeId, day_type: DayType) -> &[f64] {
        match day_type {
            DayType::Weekday => &self.weekday[store],
            DayType::Saturday => &self.saturday[store],
        }
    }
}

impl DemandSampler for BootstrapSampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        day_type: DayType,
        runs: usize,
        rng: &mut R,
    ) -> Result<Vec<DemandRealization>> {
        let stores = problem.stores();

        Ok((0..runs)
            .map(|run| {
                let mut demand = vec![0.0; problem.nodes.len()];
                for &store in &stores {
                    demand[store] = self
                        .observations(store, day_type)
                        .choose(&mut *rng)
                        .copied()
                        .unwrap_or(0.0);
                }
                DemandRealization::new(&format!("Run{}", run + 1), demand)
            })
            .collect())
    }
}

/// Perturbs expected demand with rounded normal noise, floored at zero.
#[derive(Debug, Clone)]
pub struct PerturbationSampler {
    pub weekday_sd: f64,
    pub saturday_sd: f64,
}

impl Default for PerturbationSampler {
    fn default() -> Self {
        PerturbationSampler {
            weekday_sd: 1.5,
            saturday_sd: 0.5,
        }
    }
}

impl DemandSampler for PerturbationSampler {
    fn sample<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        day_type: DayType,
        runs: usize,
        rng: &mut R,
    ) -> Result<Vec<DemandRealization>> {
        let sd = match day_type {
            DayType::Weekday => self.weekday_sd,
            DayType::Saturday => self.saturday_sd,
        };
        let noise = Normal::new(0.0, sd).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let stores = problem.stores();

        Ok((0..runs)
            .map(|run| {
                let mut demand = vec![0.0; problem.nodes.len()];
                for &store in &stores {
                    let mean = problem.demands.get(store, day_type);
                    demand[store] = (mean + noise.sample(&mut *rng)).round().max(0.0);
                }
                DemandRealization::new(&format!("Run{}", run + 1), demand)
            })
            .collect())
    }
}
