use std::path::PathBuf;

use clap::Args;
use nlpform_lang::{presets, Bound, Error, InputError, ProblemSpec};
use nlpform_solver::Sense;

/// Where the problem comes from, plus per-field overrides
#[derive(Args, Debug, Default, Clone)]
pub struct ProblemArgs {
    /// Problem file (TOML)
    pub file: Option<PathBuf>,
    /// Start from a built-in problem (see `nlpform presets`)
    #[arg(short, long, conflicts_with = "file")]
    pub preset: Option<String>,
    /// Number of decision variables, named x1..xN
    #[arg(short = 'n', long)]
    pub vars: Option<usize>,
    /// Objective expression, e.g. "x1**2 + x2**2"
    #[arg(short, long)]
    pub objective: Option<String>,
    /// Constraint such as "x1 + x2 <= 5" (repeatable, replaces the file's list)
    #[arg(short, long = "constraint")]
    pub constraints: Vec<String>,
    /// Variable bound as LB or LB:UB, in variable order (repeatable)
    #[arg(short, long = "bound", value_parser = parse_bound)]
    pub bounds: Vec<Bound>,
    /// Maximize instead of minimize
    #[arg(long)]
    pub maximize: bool,
    /// Wall-clock budget for the solver in seconds
    #[arg(long)]
    pub time_limit: Option<f64>,
    /// Cap on objective evaluations
    #[arg(long)]
    pub max_evaluations: Option<usize>,
}

pub fn parse_bound(text: &str) -> Result<Bound, String> {
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| format!("`{}` is not a number", s.trim()))
    };
    match text.split_once(':') {
        Some((lower, upper)) if upper.trim().is_empty() => Ok(Bound::lower(number(lower)?)),
        Some((lower, upper)) => Ok(Bound::new(number(lower)?, Some(number(upper)?))),
        None => Ok(Bound::lower(number(text)?)),
    }
}

impl ProblemArgs {
    /// Load the base problem and apply command-line overrides
    pub fn resolve(&self) -> Result<ProblemSpec, Error> {
        let mut spec = match (&self.file, &self.preset) {
            (Some(path), _) => ProblemSpec::load(path)?,
            (None, Some(name)) => presets::find(name)
                .map(|p| p.spec())
                .ok_or_else(|| Error::Config(format!("unknown preset `{}`", name)))?,
            (None, None) => {
                let objective = self.objective.clone().ok_or(InputError::Missing("objective"))?;
                let vars = self.vars.ok_or(InputError::Missing("variable count"))?;
                ProblemSpec::new(vars, objective)
            }
        };

        if let Some(vars) = self.vars {
            spec.variables = vars;
        }
        if let Some(objective) = &self.objective {
            spec.objective = objective.clone();
        }
        if !self.constraints.is_empty() {
            spec.constraints = self.constraints.clone();
        }
        if !self.bounds.is_empty() {
            spec.bounds = self.bounds.clone();
        }
        if self.maximize {
            spec.sense = Sense::Maximize;
        }
        if let Some(seconds) = self.time_limit {
            spec.solver = spec.solver.with_time_limit(seconds);
        }
        if let Some(max) = self.max_evaluations {
            spec.solver = spec.solver.with_max_evaluations(max);
        }
        Ok(spec)
    }
}
