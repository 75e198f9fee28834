//! Built-in example problems.

use crate::input::{Bound, ProblemSpec};

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    variables: usize,
    objective: &'static str,
    constraints: &'static [&'static str],
}

impl Preset {
    /// Every preset minimizes with all variables bounded below by zero
    pub fn spec(&self) -> ProblemSpec {
        ProblemSpec {
            constraints: self.constraints.iter().map(|c| c.to_string()).collect(),
            bounds: vec![Bound::lower(0.0); self.variables],
            ..ProblemSpec::new(self.variables, self.objective)
        }
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "default",
        description: "Sum of squares on the unit simplex",
        variables: 3,
        objective: "x1**2 + x2**2 + x3**2",
        constraints: &["x1 + x2 + x3 == 1"],
    },
    Preset {
        name: "course",
        description: "Quadratic with a linear and a nonlinear equality",
        variables: 3,
        objective: "2*x1**2 + 2*x2**2 + x3**2 - 2*x1*x2 - 4*x1 - 6*x2",
        constraints: &["x1 + x2 + x3 == 2", "x1**2 + 5*x2 == 5"],
    },
    Preset {
        name: "simple",
        description: "Shifted paraboloid with an inactive inequality",
        variables: 2,
        objective: "(x1-3)**2 + (x2-2)**2",
        constraints: &["x1 + x2 <= 5"],
    },
    Preset {
        name: "complex",
        description: "Indefinite quadratic with three equalities",
        variables: 3,
        objective: "4*x1**2 + 2*x2**2 - x3**2 + 2*x1*x3 - 2*x1 + 5*x2",
        constraints: &["x1 + x2 + x3 == 4", "2*x1**2 + x1*x2 == 2", "x1 + 2*x2 == 6"],
    },
];

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;

    #[test]
    fn test_every_preset_builds() {
        for preset in PRESETS {
            let model = ModelBuilder::build(&preset.spec())
                .unwrap_or_else(|e| panic!("preset {} failed: {}", preset.name, e));
            assert_eq!(model.constraints.len(), preset.constraints.len());
        }
    }

    #[test]
    fn test_find() {
        assert_eq!(find("Simple").map(|p| p.name), Some("simple"));
        assert!(find("missing").is_none());
        assert_eq!(find("default").unwrap().spec().variables, 3);
    }
}
