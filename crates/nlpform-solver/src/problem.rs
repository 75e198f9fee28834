use std::fmt;

use crate::error::SolveError;
use crate::term::{Term, VarId};

/// Represents a nonlinear programming problem
#[derive(Debug, Clone)]
pub struct NlpProblem {
    /// Declared decision variables, indexed by [`VarId`]
    pub variables: Vec<Variable>,
    /// Objective expression and direction
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Starting point handed to the solver
    pub initial: f64,
    pub lower: f64,
    /// `None` means unbounded above
    pub upper: Option<f64>,
}

impl Variable {
    pub fn upper_or_infinity(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Minimize => write!(f, "minimize"),
            Sense::Maximize => write!(f, "maximize"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub term: Term,
    pub sense: Sense,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    pub lhs: Term,
    pub op: ConstraintOp,
    pub rhs: Term,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (==)
    Eq,
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOp::Le => write!(f, "<="),
            ConstraintOp::Ge => write!(f, ">="),
            ConstraintOp::Eq => write!(f, "=="),
        }
    }
}

impl ConstraintOp {
    /// Amount by which `lhs op rhs` is violated; zero when it holds.
    pub fn violation(self, lhs: f64, rhs: f64) -> f64 {
        let diff = lhs - rhs;
        if diff.is_nan() {
            return f64::INFINITY;
        }
        match self {
            ConstraintOp::Le => diff.max(0.0),
            ConstraintOp::Ge => (-diff).max(0.0),
            ConstraintOp::Eq => diff.abs(),
        }
    }
}

impl Constraint {
    pub fn violation(&self, point: &[f64]) -> f64 {
        self.op.violation(self.lhs.eval(point), self.rhs.eval(point))
    }

    /// Terms that must all be non-negative for the constraint to hold
    pub fn nonnegative_forms(&self) -> Vec<Term> {
        let lhs = self.lhs.clone();
        let rhs = self.rhs.clone();
        match self.op {
            ConstraintOp::Le => vec![rhs - lhs],
            ConstraintOp::Ge => vec![lhs - rhs],
            ConstraintOp::Eq => vec![lhs.clone() - rhs.clone(), rhs - lhs],
        }
    }
}

impl NlpProblem {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            objective: Objective {
                term: Term::constant(0.0),
                sense: Sense::Minimize,
            },
            constraints: Vec::new(),
        }
    }

    /// Declare a decision variable and return its symbolic handle.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        initial: f64,
        lower: f64,
        upper: Option<f64>,
    ) -> Term {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            initial,
            lower,
            upper,
        });
        Term::var(id)
    }

    pub fn set_objective(&mut self, term: Term, sense: Sense) {
        self.objective = Objective { term, sense };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, lhs: Term, op: ConstraintOp, rhs: Term) {
        self.constraints.push(Constraint {
            name: name.into(),
            lhs,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    /// Worst constraint violation at `point`
    pub fn max_violation(&self, point: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(point))
            .fold(0.0, f64::max)
    }

    /// Check the model is well formed before handing it to a solver
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.variables.is_empty() {
            return Err(SolveError::EmptyModel);
        }
        for var in &self.variables {
            let upper = var.upper_or_infinity();
            if var.lower.is_nan() || upper.is_nan() || var.lower > upper {
                return Err(SolveError::InvalidBounds {
                    variable: var.name.clone(),
                    lower: var.lower,
                    upper,
                });
            }
        }
        let n = self.variables.len();
        let terms = std::iter::once(&self.objective.term).chain(
            self.constraints
                .iter()
                .flat_map(|c| [&c.lhs, &c.rhs]),
        );
        for term in terms {
            if let Some(id) = term.variables().into_iter().find(|id| id.0 >= n) {
                return Err(SolveError::UnknownVariable(id));
            }
        }
        Ok(())
    }
}

impl Default for NlpProblem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_violation_by_op() {
        assert_eq!(ConstraintOp::Le.violation(1.0, 2.0), 0.0);
        assert_relative_eq!(ConstraintOp::Le.violation(2.5, 2.0), 0.5);
        assert_eq!(ConstraintOp::Ge.violation(3.0, 2.0), 0.0);
        assert_relative_eq!(ConstraintOp::Ge.violation(1.0, 2.0), 1.0);
        assert_relative_eq!(ConstraintOp::Eq.violation(1.0, 2.0), 1.0);
        assert_eq!(ConstraintOp::Eq.violation(f64::NAN, 2.0), f64::INFINITY);
    }

    #[test]
    fn test_build_problem() {
        let mut problem = NlpProblem::new();
        let x = problem.add_variable("x1", 0.0, 0.0, None);
        let y = problem.add_variable("x2", 0.0, 0.0, Some(4.0));
        problem.set_objective(x.clone() * y.clone(), Sense::Maximize);
        problem.add_constraint("c1", x + y, ConstraintOp::Le, Term::constant(4.0));

        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.num_constraints(), 1);
        assert_eq!(problem.variable_names(), vec!["x1", "x2"]);
        assert!(problem.validate().is_ok());
        assert_relative_eq!(problem.max_violation(&[3.0, 2.0]), 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_models() {
        assert!(matches!(NlpProblem::new().validate(), Err(SolveError::EmptyModel)));

        let mut problem = NlpProblem::new();
        problem.add_variable("x1", 0.0, 5.0, Some(1.0));
        assert!(matches!(problem.validate(), Err(SolveError::InvalidBounds { .. })));

        let mut problem = NlpProblem::new();
        problem.add_variable("x1", 0.0, 0.0, None);
        problem.set_objective(Term::var(VarId(3)), Sense::Minimize);
        assert!(matches!(problem.validate(), Err(SolveError::UnknownVariable(VarId(3)))));
    }

    #[test]
    fn test_equality_forms() {
        let mut problem = NlpProblem::new();
        let x = problem.add_variable("x1", 0.0, 0.0, None);
        problem.add_constraint("c1", x, ConstraintOp::Eq, Term::constant(2.0));
        let forms = problem.constraints[0].nonnegative_forms();
        assert_eq!(forms.len(), 2);
        assert_relative_eq!(forms[0].eval(&[3.0]), 1.0);
        assert_relative_eq!(forms[1].eval(&[3.0]), -1.0);
    }
}
