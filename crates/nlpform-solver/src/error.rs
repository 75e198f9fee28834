use std::time::Duration;

use thiserror::Error;

use crate::term::VarId;

/// Every way a solve can fail. The message carries the solver diagnostic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Model has no variables")]
    EmptyModel,
    #[error("Invalid bounds for {variable}: lower {lower} exceeds upper {upper}")]
    InvalidBounds {
        variable: String,
        lower: f64,
        upper: f64,
    },
    #[error("Term references undeclared variable {0}")]
    UnknownVariable(VarId),
    #[error("COBYLA stopped with {status}")]
    Backend { status: String },
    #[error("No feasible point found: worst constraint violation {violation:.3e} exceeds tolerance {tolerance:.1e}")]
    Infeasible { violation: f64, tolerance: f64 },
    #[error("Objective is not finite at the solver's final point")]
    NonFinite,
    #[error("Solver did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("Solver worker terminated unexpectedly")]
    WorkerLost,
}

impl SolveError {
    /// Short stable code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            SolveError::EmptyModel => "MODEL_EMPTY",
            SolveError::InvalidBounds { .. } => "MODEL_INVALID_BOUNDS",
            SolveError::UnknownVariable(_) => "MODEL_UNKNOWN_VARIABLE",
            SolveError::Backend { .. } => "SOLVER_INTERNAL",
            SolveError::Infeasible { .. } => "SOLVER_INFEASIBLE",
            SolveError::NonFinite => "SOLVER_NON_FINITE",
            SolveError::TimedOut(_) => "SOLVER_TIME_LIMIT",
            SolveError::WorkerLost => "SOLVER_WORKER_LOST",
        }
    }
}
