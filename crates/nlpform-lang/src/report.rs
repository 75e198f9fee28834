use std::fmt;

use nlpform_solver::{ConstraintOp, Sense, Solution};
use serde::Serialize;

use crate::builder::CompiledModel;
use crate::error::Error;
use crate::eval::Bindings;

/// Absolute slack when judging whether a solved point satisfies a constraint
pub const SATISFACTION_TOLERANCE: f64 = 1e-5;

/// `true` when the violation of `left op right` is at most `tolerance`.
/// A violation exactly equal to the tolerance counts as satisfied.
pub fn is_satisfied(op: ConstraintOp, left: f64, right: f64, tolerance: f64) -> bool {
    op.violation(left, right) <= tolerance
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub name: String,
    pub value: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConstraintCheck {
    pub constraint: String,
    pub op: ConstraintOp,
    pub left: f64,
    pub right: f64,
    pub satisfied: bool,
}

/// Solved values and the user's expressions re-evaluated at them
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Report {
    pub sense: Sense,
    pub objective: String,
    pub objective_value: f64,
    pub variables: Vec<VariableValue>,
    pub constraints: Vec<ConstraintCheck>,
    pub solver_status: String,
}

impl Report {
    pub fn new(model: &CompiledModel, solution: &Solution) -> Result<Self, Error> {
        let values: Bindings<f64> = model
            .variable_names
            .iter()
            .cloned()
            .zip(solution.values.iter().copied())
            .collect();

        let objective_value = values.evaluate(&model.objective.expr, &model.objective.source)?;

        let mut constraints = Vec::with_capacity(model.constraints.len());
        for c in &model.constraints {
            let left = values.evaluate(&c.left.expr, &c.left.source)?;
            let right = values.evaluate(&c.right.expr, &c.right.source)?;
            constraints.push(ConstraintCheck {
                constraint: c.source.clone(),
                op: c.op,
                left,
                right,
                satisfied: is_satisfied(c.op, left, right, SATISFACTION_TOLERANCE),
            });
        }

        let variables = values
            .names()
            .iter()
            .zip(&solution.values)
            .map(|(name, value)| VariableValue {
                name: name.clone(),
                value: *value,
            })
            .collect();

        Ok(Self {
            sense: model.sense,
            objective: model.objective.source.clone(),
            objective_value,
            variables,
            constraints,
            solver_status: solution.status.clone(),
        })
    }

    pub fn all_satisfied(&self) -> bool {
        self.constraints.iter().all(|c| c.satisfied)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.variables.iter().find(|v| v.name == name).map(|v| v.value)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variables:")?;
        for v in &self.variables {
            writeln!(f, "  {:10} {:>14.6}", v.name, v.value)?;
        }
        writeln!(f)?;

        let verb = match self.sense {
            Sense::Minimize => "minimized",
            Sense::Maximize => "maximized",
        };
        writeln!(f, "Objective ({}): {}", verb, self.objective)?;
        writeln!(f, "  f(x) = {:.6}", self.objective_value)?;

        if !self.constraints.is_empty() {
            writeln!(f)?;
            let width = self
                .constraints
                .iter()
                .map(|c| c.constraint.chars().count())
                .max()
                .unwrap_or(0)
                .max("Constraint".len());
            writeln!(
                f,
                "  {:width$}  {:>14}  {:>14}  {}",
                "Constraint",
                "Left",
                "Right",
                "Status",
                width = width
            )?;
            for c in &self.constraints {
                writeln!(
                    f,
                    "  {:width$}  {:>14.6}  {:>14.6}  {}",
                    c.constraint,
                    c.left,
                    c.right,
                    if c.satisfied { "OK" } else { "FAIL" },
                    width = width
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use crate::input::ProblemSpec;

    #[test]
    fn test_tolerance_boundary() {
        let tol = SATISFACTION_TOLERANCE;
        // A violation exactly equal to the tolerance counts as satisfied
        assert!(is_satisfied(ConstraintOp::Eq, tol, 0.0, tol));
        assert!(is_satisfied(ConstraintOp::Le, tol, 0.0, tol));
        assert!(is_satisfied(ConstraintOp::Ge, 0.0, tol, tol));
        assert!(is_satisfied(ConstraintOp::Eq, 1.5, 1.0, 0.5));

        assert!(!is_satisfied(ConstraintOp::Eq, 3.0 * tol, tol, tol));
        assert!(is_satisfied(ConstraintOp::Le, 4.0, 5.0, tol));
        assert!(is_satisfied(ConstraintOp::Le, 5.0 + 0.5 * tol, 5.0, tol));
        assert!(!is_satisfied(ConstraintOp::Le, 5.0 + 2.0 * tol, 5.0, tol));
        assert!(is_satisfied(ConstraintOp::Ge, 6.0, 5.0, tol));
        assert!(is_satisfied(ConstraintOp::Ge, 5.0 - 0.5 * tol, 5.0, tol));
        assert!(!is_satisfied(ConstraintOp::Ge, 5.0 - 2.0 * tol, 5.0, tol));
    }

    #[test]
    fn test_nan_is_never_satisfied() {
        assert!(!is_satisfied(ConstraintOp::Le, f64::NAN, 0.0, SATISFACTION_TOLERANCE));
    }

    fn report_at(spec: &ProblemSpec, values: Vec<f64>) -> Report {
        let model = ModelBuilder::build(spec).unwrap();
        let solution = Solution {
            values,
            objective_value: f64::NAN,
            max_violation: 0.0,
            status: "Success".to_string(),
        };
        Report::new(&model, &solution).unwrap()
    }

    #[test]
    fn test_report_recomputes_from_text() {
        let spec = ProblemSpec::new(2, "(x1-3)**2 + (x2-2)**2")
            .with_constraint("x1 + x2 <= 5")
            .with_constraint("x1 >= 4");
        let report = report_at(&spec, vec![3.0, 2.0]);

        assert_eq!(report.objective_value, 0.0);
        assert_eq!(report.value("x1"), Some(3.0));
        assert_eq!(report.value("x3"), None);

        let sum = &report.constraints[0];
        assert_eq!((sum.left, sum.right, sum.satisfied), (5.0, 5.0, true));
        let lower = &report.constraints[1];
        assert_eq!((lower.left, lower.right, lower.satisfied), (3.0, 4.0, false));
        assert!(!report.all_satisfied());
    }

    #[test]
    fn test_display_tables() {
        let spec = ProblemSpec::new(2, "x1 + x2").with_constraint("x1 + x2 == 1");
        let text = report_at(&spec, vec![0.25, 0.75]).to_string();

        assert!(text.contains("Objective (minimized): x1 + x2"), "{}", text);
        assert!(text.contains("f(x) = 1.000000"), "{}", text);
        assert!(text.contains("0.250000"), "{}", text);
        let row = text.lines().find(|l| l.contains("x1 + x2 == 1")).unwrap();
        assert!(row.trim_end().ends_with("OK"), "{}", row);
    }
}
