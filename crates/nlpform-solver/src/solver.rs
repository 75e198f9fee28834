use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use cobyla::{Func, RhoBeg, StopTols};

use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::problem::{NlpProblem, Sense};
use crate::solution::Solution;

/// The one call into an external nonlinear solver.
///
/// Implementations run a single solve: no retries, no multi-start and no
/// state carried between calls.
pub trait NlpSolver {
    fn solve(&self, problem: &NlpProblem) -> Result<Solution, SolveError>;
}

/// Derivative-free constrained solver backed by the `cobyla` crate
#[derive(Debug, Clone, Default)]
pub struct CobylaSolver {
    config: SolverConfig,
}

impl CobylaSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl NlpSolver for CobylaSolver {
    fn solve(&self, problem: &NlpProblem) -> Result<Solution, SolveError> {
        problem.validate()?;

        tracing::info!(
            component = "solver",
            operation = "solve",
            num_variables = problem.num_variables(),
            num_constraints = problem.num_constraints(),
            sense = %problem.objective.sense,
            "Starting COBYLA solve"
        );
        let started = Instant::now();

        let result = match self.config.time_limit() {
            None => run(problem, &self.config),
            Some(limit) => {
                let (tx, rx) = mpsc::channel();
                let owned = problem.clone();
                let config = self.config.clone();
                thread::Builder::new()
                    .name("nlpform-solve".to_string())
                    .spawn(move || {
                        // The receiver is gone after a timeout; nothing to report then.
                        let _ = tx.send(run(&owned, &config));
                    })
                    .map_err(|e| SolveError::Backend {
                        status: format!("cannot start solver thread: {}", e),
                    })?;

                match rx.recv_timeout(limit) {
                    Ok(result) => result,
                    Err(RecvTimeoutError::Timeout) => Err(SolveError::TimedOut(limit)),
                    Err(RecvTimeoutError::Disconnected) => Err(SolveError::WorkerLost),
                }
            }
        };

        match &result {
            Ok(solution) => tracing::info!(
                component = "solver",
                operation = "solve",
                status = "success",
                objective = solution.objective_value,
                max_violation = solution.max_violation,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "COBYLA finished: {}",
                solution.status
            ),
            Err(e @ (SolveError::TimedOut(_) | SolveError::Infeasible { .. })) => tracing::warn!(
                component = "solver",
                operation = "solve",
                status = "failure",
                code = e.code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "COBYLA stopped: {}",
                e
            ),
            Err(e) => tracing::error!(
                component = "solver",
                operation = "solve",
                status = "failure",
                code = e.code(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "COBYLA failed: {}",
                e
            ),
        }

        result
    }
}

fn run(problem: &NlpProblem, config: &SolverConfig) -> Result<Solution, SolveError> {
    // COBYLA only minimizes
    let sign = match problem.objective.sense {
        Sense::Minimize => 1.0,
        Sense::Maximize => -1.0,
    };
    let objective_term = problem.objective.term.clone();
    let objective = move |x: &[f64], _data: &mut ()| sign * objective_term.eval(x);

    // Each constraint becomes one or two `g(x) >= 0` functions
    let constraint_fns: Vec<Box<dyn Func<()>>> = problem
        .constraints
        .iter()
        .flat_map(|c| c.nonnegative_forms())
        .map(|term| Box::new(move |x: &[f64], _data: &mut ()| term.eval(x)) as Box<dyn Func<()>>)
        .collect();
    let cons: Vec<&dyn Func<()>> = constraint_fns.iter().map(|f| f.as_ref()).collect();

    let bounds: Vec<(f64, f64)> = problem
        .variables
        .iter()
        .map(|v| (v.lower, v.upper_or_infinity()))
        .collect();
    let x0: Vec<f64> = problem
        .variables
        .iter()
        .map(|v| v.initial.clamp(v.lower, v.upper_or_infinity()))
        .collect();

    for (var, start) in problem.variables.iter().zip(&x0) {
        tracing::debug!(
            component = "solver",
            variable = %var.name,
            start = *start,
            lower = var.lower,
            upper = var.upper_or_infinity(),
            "Declared variable"
        );
    }

    let stop_tol = StopTols {
        xtol_rel: config.x_tolerance,
        ..StopTols::default()
    };

    let (status, values) = match cobyla::minimize(
        objective,
        &x0,
        &bounds,
        &cons,
        (),
        config.max_evaluations,
        RhoBeg::All(config.rho_begin),
        Some(stop_tol),
    ) {
        Ok((status, x, _)) => (format!("{:?}", status), x),
        Err((status, _, _)) => {
            return Err(SolveError::Backend {
                status: format!("{:?}", status),
            });
        }
    };

    let objective_value = problem.objective.term.eval(&values);
    if !objective_value.is_finite() {
        return Err(SolveError::NonFinite);
    }

    let max_violation = problem.max_violation(&values);
    if !(max_violation <= config.feasibility_tolerance) {
        return Err(SolveError::Infeasible {
            violation: max_violation,
            tolerance: config.feasibility_tolerance,
        });
    }

    Ok(Solution {
        values,
        objective_value,
        max_violation,
        status,
    })
}
