use std::path::Path;

use nlpform_solver::{Sense, SolverConfig};
use serde::{Deserialize, Serialize};

use crate::error::{Error, InputError};

/// Limits of the entry form
pub const MAX_VARIABLES: usize = 10;
pub const MAX_CONSTRAINTS: usize = 20;

/// Lower and optional upper bound of one variable
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Bound {
    #[serde(default)]
    pub lower: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

impl Bound {
    pub fn new(lower: f64, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn lower(lower: f64) -> Self {
        Self { lower, upper: None }
    }
}

impl Default for Bound {
    fn default() -> Self {
        Self::lower(0.0)
    }
}

/// A problem as the user states it: counts, expression strings and bounds.
///
/// This is also the on-disk TOML format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProblemSpec {
    pub variables: usize,
    #[serde(default)]
    pub sense: Sense,
    pub objective: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub bounds: Vec<Bound>,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl ProblemSpec {
    pub fn new(variables: usize, objective: impl Into<String>) -> Self {
        Self {
            variables,
            sense: Sense::Minimize,
            objective: objective.into(),
            constraints: Vec::new(),
            bounds: Vec::new(),
            solver: SolverConfig::default(),
        }
    }

    pub fn with_sense(mut self, sense: Sense) -> Self {
        self.sense = sense;
        self
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<Bound>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&text)
    }

    /// `x1`, `x2`, ... for the declared count
    pub fn variable_names(&self) -> Vec<String> {
        (1..=self.variables).map(|i| format!("x{}", i)).collect()
    }

    /// Bound for the variable at `index`; `0 <= x` when none was given
    pub fn bound(&self, index: usize) -> Bound {
        self.bounds.get(index).copied().unwrap_or_default()
    }

    /// Constraint strings with blank entries dropped
    pub fn active_constraints(&self) -> impl Iterator<Item = &str> {
        self.constraints
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.variables == 0 || self.variables > MAX_VARIABLES {
            return Err(InputError::VariableCount {
                count: self.variables,
                max: MAX_VARIABLES,
            });
        }
        if self.objective.trim().is_empty() {
            return Err(InputError::Missing("objective"));
        }
        let constraints = self.active_constraints().count();
        if constraints > MAX_CONSTRAINTS {
            return Err(InputError::TooManyConstraints {
                count: constraints,
                max: MAX_CONSTRAINTS,
            });
        }
        if self.bounds.len() > self.variables {
            return Err(InputError::TooManyBounds {
                bounds: self.bounds.len(),
                variables: self.variables,
            });
        }
        for (index, name) in self.variable_names().into_iter().enumerate() {
            let bound = self.bound(index);
            let upper_ok = bound.upper.is_none_or(|u| !u.is_nan() && u >= bound.lower);
            if !bound.lower.is_finite() || !upper_ok {
                return Err(InputError::InvalidBound {
                    variable: name,
                    lower: bound.lower,
                    upper: bound.upper,
                });
            }
        }
        Ok(())
    }
}
