//! Regenerates a compiled model as standalone text the user can keep.
//!
//! Expressions are written from the parsed tree, not copied from the input,
//! so what is emitted is exactly what was solved.

use std::fmt::Write;
use std::str::FromStr;

use nlpform_solver::{Sense, SolverConfig};

use crate::builder::CompiledModel;
use crate::error::Error;
use crate::input::{Bound, ProblemSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Python script for the GEKKO modelling package
    Gekko,
    /// Problem file loadable by `nlpform solve`
    Toml,
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gekko" | "python" | "py" => Ok(Target::Gekko),
            "toml" => Ok(Target::Toml),
            other => Err(format!("unknown target `{}` (expected gekko or toml)", other)),
        }
    }
}

pub fn emit(model: &CompiledModel, solver: &SolverConfig, target: Target) -> Result<String, Error> {
    match target {
        Target::Gekko => Ok(emit_gekko(model)),
        Target::Toml => to_spec(model, solver).to_toml(),
    }
}

/// Rebuild a [`ProblemSpec`] from the model in canonical form
pub fn to_spec(model: &CompiledModel, solver: &SolverConfig) -> ProblemSpec {
    ProblemSpec {
        variables: model.variable_names.len(),
        sense: model.sense,
        objective: model.objective.expr.to_string(),
        constraints: model
            .constraints
            .iter()
            .map(|c| format!("{} {} {}", c.left.expr, c.op, c.right.expr))
            .collect(),
        bounds: model
            .problem
            .variables
            .iter()
            .map(|v| Bound::new(v.lower, v.upper))
            .collect(),
        solver: solver.clone(),
    }
}

fn python_float(value: f64) -> String {
    // Debug always keeps a decimal point or exponent, which Python reads as float
    format!("{:?}", value)
}

pub fn emit_gekko(model: &CompiledModel) -> String {
    let mut code = String::new();
    code.push_str("import gekko\n\nm = gekko.GEKKO(remote=False)\nm.options.SOLVER = 3  # IPOPT\n\n");

    code.push_str("# Variables\n");
    for var in &model.problem.variables {
        let lower = python_float(var.lower);
        let _ = match var.upper.filter(|u| u.is_finite()) {
            Some(upper) => writeln!(
                code,
                "{name} = m.Var(value={lower}, lb={lower}, ub={upper}, name='{name}')",
                name = var.name,
                lower = lower,
                upper = python_float(upper)
            ),
            None => writeln!(
                code,
                "{name} = m.Var(value={lower}, lb={lower}, name='{name}')",
                name = var.name,
                lower = lower
            ),
        };
    }

    code.push_str("\n# Objective\n");
    let _ = writeln!(code, "obj = {}", model.objective.expr);

    code.push_str("\n# Constraints\n");
    for c in &model.constraints {
        let _ = writeln!(code, "m.Equation({} {} {})", c.left.expr, c.op, c.right.expr);
    }

    code.push_str("\n# Optimize\n");
    match model.sense {
        Sense::Minimize => code.push_str("m.Minimize(obj)\n"),
        Sense::Maximize => code.push_str("m.Maximize(obj)\n"),
    }
    code.push_str("\nm.solve(disp=False)\n\n# Results\n");
    for name in &model.variable_names {
        let _ = writeln!(code, "print(f'{name} = {{{name}.value[0]}}')", name = name);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;

    fn scenario() -> CompiledModel {
        let spec = ProblemSpec::new(2, "(x1-3)**2 + (x2-2)**2")
            .with_constraint("x1+x2<=5")
            .with_bounds(vec![Bound::lower(0.0), Bound::new(0.0, Some(10.0))]);
        ModelBuilder::build(&spec).unwrap()
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!("gekko".parse::<Target>(), Ok(Target::Gekko));
        assert_eq!("TOML".parse::<Target>(), Ok(Target::Toml));
        assert!("rust".parse::<Target>().is_err());
    }

    #[test]
    fn test_gekko_script() {
        let code = emit_gekko(&scenario());
        let expected_lines = [
            "import gekko",
            "x1 = m.Var(value=0.0, lb=0.0, name='x1')",
            "x2 = m.Var(value=0.0, lb=0.0, ub=10.0, name='x2')",
            "obj = (x1 - 3)**2 + (x2 - 2)**2",
            "m.Equation(x1 + x2 <= 5)",
            "m.Minimize(obj)",
            "m.solve(disp=False)",
            "print(f'x2 = {x2.value[0]}')",
        ];
        for line in expected_lines {
            assert!(code.lines().any(|l| l == line), "missing `{}` in:\n{}", line, code);
        }
    }

    #[test]
    fn test_gekko_maximize() {
        let spec = ProblemSpec::new(1, "x1").with_sense(Sense::Maximize);
        let code = emit_gekko(&ModelBuilder::build(&spec).unwrap());
        assert!(code.contains("m.Maximize(obj)"));
        assert!(!code.contains("m.Equation"));
    }

    #[test]
    fn test_toml_is_canonical_and_reloadable() {
        let model = scenario();
        let text = emit(&model, &SolverConfig::default(), Target::Toml).unwrap();
        let spec = ProblemSpec::from_toml(&text).unwrap();

        assert_eq!(spec.objective, "(x1 - 3)**2 + (x2 - 2)**2");
        assert_eq!(spec.constraints, vec!["x1 + x2 <= 5"]);
        assert_eq!(spec.bounds[1], Bound::new(0.0, Some(10.0)));

        let rebuilt = ModelBuilder::build(&spec).unwrap();
        let point = [1.25, 4.5];
        assert_eq!(
            rebuilt.problem.objective.term.eval(&point),
            model.problem.objective.term.eval(&point)
        );
    }
}
