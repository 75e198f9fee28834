//! Solver configuration types.

use std::time::Duration;

/// Configuration options for the nonlinear solver.
///
/// Loaded from the `[solver]` table of a problem file when the `serde`
/// feature is enabled; any missing key keeps its default.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of objective evaluations.
    pub max_evaluations: usize,
    /// Initial trust-region radius.
    pub rho_begin: f64,
    /// Relative step tolerance used as the stopping criterion.
    pub x_tolerance: f64,
    /// Largest constraint violation accepted in a returned solution.
    pub feasibility_tolerance: f64,
    /// Wall-clock budget in seconds. `None` means no limit.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub time_limit_secs: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_evaluations: 4000,
            rho_begin: 0.5,
            x_tolerance: 1e-8,
            feasibility_tolerance: 1e-4,
            time_limit_secs: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_evaluations(mut self, max: usize) -> Self {
        self.max_evaluations = max;
        self
    }

    pub fn with_rho_begin(mut self, rho: f64) -> Self {
        self.rho_begin = rho;
        self
    }

    pub fn with_x_tolerance(mut self, tol: f64) -> Self {
        self.x_tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_secs = Some(seconds);
        self
    }

    /// Time limit as a [`Duration`]. Negative or non-finite values disable it.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SolverConfig::new()
            .with_max_evaluations(100)
            .with_time_limit(1.5)
            .with_feasibility_tolerance(1e-3);
        assert_eq!(config.max_evaluations, 100);
        assert_eq!(config.time_limit(), Some(Duration::from_millis(1500)));
        assert_eq!(config.feasibility_tolerance, 1e-3);
    }

    #[test]
    fn test_invalid_time_limit_is_ignored() {
        assert_eq!(SolverConfig::new().time_limit(), None);
        assert_eq!(SolverConfig::new().with_time_limit(-1.0).time_limit(), None);
        assert_eq!(SolverConfig::new().with_time_limit(f64::NAN).time_limit(), None);
    }
}
