use nlpform_solver::SolveError;
use thiserror::Error;

use crate::eval::EvalError;
use crate::parser::ParseError;
use crate::relation::FormatError;

/// Problem inputs outside what the builder accepts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Variable count must be between 1 and {max}, got {count}")]
    VariableCount { count: usize, max: usize },
    #[error("At most {max} constraints are supported, got {count}")]
    TooManyConstraints { count: usize, max: usize },
    #[error("Bounds given for {bounds} variables but only {variables} are declared")]
    TooManyBounds { bounds: usize, variables: usize },
    #[error("No {0} given")]
    Missing(&'static str),
    #[error("Invalid bounds for {variable}: lower {lower}, upper {upper:?}")]
    InvalidBound {
        variable: String,
        lower: f64,
        upper: Option<f64>,
    },
}

/// Every failure surfaced at the outer boundary.
///
/// Input is never partially applied: any of these aborts the run before
/// results are produced.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] ParseError),
    #[error(transparent)]
    Binding(#[from] EvalError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Solver(#[from] SolveError),
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid problem definition: {0}")]
    Config(String),
}

impl Error {
    /// Category name used in user-facing messages
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Syntax(_) => "syntax error",
            Error::Binding(_) => "binding error",
            Error::Format(_) => "format error",
            Error::Input(_) => "input error",
            Error::Solver(_) => "solver error",
            Error::Io { .. } => "io error",
            Error::Config(_) => "config error",
        }
    }
}
