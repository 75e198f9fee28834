/// The result of a successful nonlinear solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solved value for each variable, in declaration order
    pub values: Vec<f64>,
    /// Objective value at `values`, in the problem's own sense
    pub objective_value: f64,
    /// Worst constraint violation at `values`
    pub max_violation: f64,
    /// Backend termination status
    pub status: String,
}

impl Solution {
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}
