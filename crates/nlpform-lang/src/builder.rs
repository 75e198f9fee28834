use nlpform_solver::{CobylaSolver, ConstraintOp, NlpProblem, NlpSolver, Sense, Solution, Term};

use crate::ast::Expr;
use crate::error::Error;
use crate::eval::Bindings;
use crate::input::ProblemSpec;
use crate::parser::{ParseError, Parser};
use crate::relation::split_constraint;
use crate::report::Report;

/// An expression together with the text it was parsed from
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpr {
    pub source: String,
    pub expr: Expr,
}

impl ParsedExpr {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            source: source.to_string(),
            expr: Parser::parse(source)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledConstraint {
    /// The constraint as the user wrote it (trimmed)
    pub source: String,
    pub left: ParsedExpr,
    pub op: ConstraintOp,
    pub right: ParsedExpr,
}

/// A problem whose text has been parsed, checked against the declared
/// variables and translated into a solver model
#[derive(Debug, Clone)]
pub struct CompiledModel {
    pub variable_names: Vec<String>,
    pub sense: Sense,
    pub objective: ParsedExpr,
    pub constraints: Vec<CompiledConstraint>,
    pub problem: NlpProblem,
}

/// Translates a [`ProblemSpec`] into a [`CompiledModel`]
pub struct ModelBuilder;

impl ModelBuilder {
    pub fn build(spec: &ProblemSpec) -> Result<CompiledModel, Error> {
        spec.validate()?;

        let mut problem = NlpProblem::new();
        let variable_names = spec.variable_names();
        let mut symbols: Bindings<Term> = Bindings::new();
        for (index, name) in variable_names.iter().enumerate() {
            let bound = spec.bound(index);
            let term = problem.add_variable(name.clone(), bound.lower, bound.lower, bound.upper);
            symbols.bind(name.clone(), term);
        }

        let objective = ParsedExpr::parse(spec.objective.trim())?;
        let objective_term = symbols.evaluate(&objective.expr, &objective.source)?;
        problem.set_objective(objective_term, spec.sense);

        let mut constraints = Vec::new();
        for text in spec.active_constraints() {
            let split = split_constraint(text)?;
            // Syntax errors name the whole constraint, not just one side
            let left = ParsedExpr::parse(split.left).map_err(|e| e.in_context(text, split.left_start))?;
            let right =
                ParsedExpr::parse(split.right).map_err(|e| e.in_context(text, split.right_start))?;
            let lhs = symbols.evaluate(&left.expr, &left.source)?;
            let rhs = symbols.evaluate(&right.expr, &right.source)?;

            tracing::debug!(
                component = "builder",
                constraint = text,
                op = %split.op,
                "Registered constraint"
            );
            problem.add_constraint(text, lhs, split.op, rhs);
            constraints.push(CompiledConstraint {
                source: text.to_string(),
                left,
                op: split.op,
                right,
            });
        }

        tracing::info!(
            component = "builder",
            operation = "build",
            status = "success",
            num_variables = variable_names.len(),
            num_constraints = constraints.len(),
            sense = %spec.sense,
            "Built model"
        );

        Ok(CompiledModel {
            variable_names,
            sense: spec.sense,
            objective,
            constraints,
            problem,
        })
    }
}

impl CompiledModel {
    /// Solve with the given backend and report against the user's text
    pub fn solve_with(&self, solver: &dyn NlpSolver) -> Result<(Solution, Report), Error> {
        let solution = solver.solve(&self.problem)?;
        let report = Report::new(self, &solution)?;
        Ok((solution, report))
    }
}

/// Build, solve with COBYLA using the problem's solver settings, and report
pub fn solve(spec: &ProblemSpec) -> Result<Report, Error> {
    let model = ModelBuilder::build(spec)?;
    let solver = CobylaSolver::with_config(spec.solver.clone());
    let (_, report) = model.solve_with(&solver)?;
    Ok(report)
}
