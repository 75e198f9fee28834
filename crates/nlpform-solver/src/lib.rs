mod config;
mod error;
mod problem;
mod solution;
mod solver;
mod term;

pub use config::SolverConfig;
pub use error::SolveError;
pub use problem::{Constraint, ConstraintOp, NlpProblem, Objective, Sense, Variable};
pub use solution::Solution;
pub use solver::{CobylaSolver, NlpSolver};
pub use term::{Term, TermOp, VarId};
