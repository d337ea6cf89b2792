//! Error type shared by every pipeline stage.

use std::fmt;
use thiserror::Error;

/// Pipeline stage in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Generation,
    Selection,
    Simulation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "loading",
            Stage::Generation => "generation",
            Stage::Selection => "selection",
            Stage::Simulation => "simulation",
        };
        f.write_str(name)
    }
}

/// Errors raised while planning or simulating routes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("loading: no travel duration from '{from}' to '{to}'")]
    MissingDuration { from: String, to: String },

    #[error("loading: no demand for store '{store}' ({column})")]
    MissingDemand { store: String, column: String },

    #[error("{stage}: unknown node '{node}'")]
    UnknownNode { stage: Stage, node: String },

    #[error("loading: invalid input: {0}")]
    InvalidInput(String),

    #[error("selection: store '{store}' is not visited by any candidate route")]
    UncoveredStore { store: String },

    #[error("selection: no route subset covers every store exactly once within {owned_limit} owned routes")]
    SolverInfeasible { owned_limit: usize },

    #[error("selection: search stopped after {nodes} nodes without finding a plan")]
    SearchLimitReached { nodes: usize },

    #[error("simulation: run '{run}' has invalid demand: {reason}")]
    InvalidRealization { run: String, reason: String },

    #[error("simulation: run '{run}' cannot be repaired, store '{store}' alone needs {demand} pallets")]
    UnrepairableRealization {
        run: String,
        store: String,
        demand: f64,
    },

    #[error("loading: {0}")]
    Io(#[from] std::io::Error),

    #[error("loading: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stage that raised the error.
    pub fn stage(&self) -> Stage {
        match self {
            Error::MissingDuration { .. }
            | Error::MissingDemand { .. }
            | Error::InvalidInput(_)
            | Error::Io(_)
            | Error::Json(_) => Stage::Loading,
            Error::UnknownNode { stage, .. } => *stage,
            Error::UncoveredStore { .. }
            | Error::SolverInfeasible { .. }
            | Error::SearchLimitReached { .. } => Stage::Selection,
            Error::InvalidRealization { .. } | Error::UnrepairableRealization { .. } => {
                Stage::Simulation
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
