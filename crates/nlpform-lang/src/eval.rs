use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

use nlpform_solver::Term;
use thiserror::Error;

use crate::ast::{BinaryOp, Expr, UnaryOp};

/// A numeric-like value the evaluator can compute with.
///
/// Implemented for `f64` (reporting) and for solver [`Term`]s (model
/// building), so one evaluator serves both phases.
pub trait Operand:
    Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    fn constant(value: f64) -> Self;

    fn pow(self, exponent: Self) -> Self;
}

impl Operand for f64 {
    fn constant(value: f64) -> Self {
        value
    }

    fn pow(self, exponent: Self) -> Self {
        self.powf(exponent)
    }
}

impl Operand for Term {
    fn constant(value: f64) -> Self {
        Term::constant(value)
    }

    fn pow(self, exponent: Self) -> Self {
        Term::pow(self, exponent)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown identifier `{name}` in `{source_text}` (declared: {declared})")]
    UnknownIdentifier {
        name: String,
        source_text: String,
        declared: String,
    },
}

/// Name -> value environment for evaluation
#[derive(Debug, Clone)]
pub struct Bindings<T> {
    names: Vec<String>,
    values: HashMap<String, T>,
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            values: HashMap::new(),
        }
    }
}

impl<T: Operand> Bindings<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        if self.values.insert(name.clone(), value).is_none() {
            self.names.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names in binding order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Fail with the first identifier of `expr` that is not bound
    pub fn check(&self, expr: &Expr, source_text: &str) -> Result<(), EvalError> {
        match expr.identifiers().into_iter().find(|name| !self.contains(name)) {
            Some(name) => Err(self.unknown(name, source_text)),
            None => Ok(()),
        }
    }

    /// Evaluate `expr` with standard arithmetic over `T`.
    ///
    /// `source_text` is only used to make error messages point at the
    /// expression the user wrote.
    pub fn evaluate(&self, expr: &Expr, source_text: &str) -> Result<T, EvalError> {
        self.check(expr, source_text)?;
        self.eval_node(expr, source_text)
    }

    fn eval_node(&self, expr: &Expr, source_text: &str) -> Result<T, EvalError> {
        match expr {
            Expr::Number(value) => Ok(T::constant(*value)),
            Expr::Ident { name, .. } => self
                .get(name)
                .cloned()
                .ok_or_else(|| self.unknown(name, source_text)),
            Expr::Unary { op, operand } => {
                let value = self.eval_node(operand, source_text)?;
                Ok(match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Pos => value,
                })
            }
            Expr::BinaryOp { left, op, right } => {
                let left = self.eval_node(left, source_text)?;
                let right = self.eval_node(right, source_text)?;
                Ok(match op {
                    BinaryOp::Add => left + right,
                    BinaryOp::Sub => left - right,
                    BinaryOp::Mul => left * right,
                    BinaryOp::Div => left / right,
                    BinaryOp::Pow => left.pow(right),
                })
            }
            Expr::Paren(inner) => self.eval_node(inner, source_text),
        }
    }

    fn unknown(&self, name: &str, source_text: &str) -> EvalError {
        EvalError::UnknownIdentifier {
            name: name.to_string(),
            source_text: source_text.to_string(),
            declared: self.names.join(", "),
        }
    }
}

impl<T: Operand> FromIterator<(String, T)> for Bindings<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.bind(name, value);
        }
        bindings
    }
}

/// Parse and evaluate in one step
pub fn evaluate_str<T: Operand>(source: &str, bindings: &Bindings<T>) -> Result<T, crate::Error> {
    let expr = crate::Parser::parse(source)?;
    Ok(bindings.evaluate(&expr, source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;
    use approx::assert_relative_eq;
    use nlpform_solver::{NlpProblem, Term};

    fn numeric(values: &[f64]) -> Bindings<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("x{}", i + 1), *v))
            .collect()
    }

    fn eval(source: &str, values: &[f64]) -> f64 {
        let expr = Parser::parse(source).unwrap();
        numeric(values).evaluate(&expr, source).unwrap()
    }

    #[test]
    fn test_numeric_arithmetic() {
        assert_relative_eq!(eval("1 + 2 * 3", &[]), 7.0);
        assert_relative_eq!(eval("(1 + 2) * 3", &[]), 9.0);
        assert_relative_eq!(eval("2**3**2", &[]), 512.0);
        assert_relative_eq!(eval("-2**2", &[]), -4.0);
        assert_relative_eq!(eval("2**-1", &[]), 0.5);
        assert_relative_eq!(eval("8 / 4 / 2", &[]), 1.0);
        assert_relative_eq!(eval("10 - 4 - 3", &[]), 3.0);
        assert_relative_eq!(eval("+x1 - -x2", &[1.0, 2.0]), 3.0);
    }

    #[test]
    fn test_objective_at_point() {
        let value = eval(
            "4*x1**2 + 2*x2**2 - x3**2 + 2*x1*x3 - 2*x1 + 5*x2",
            &[1.0, 2.0, 3.0],
        );
        // 4 + 8 - 9 + 6 - 2 + 10
        assert_relative_eq!(value, 17.0);
    }

    #[test]
    fn test_unknown_identifier() {
        let source = "x1 + x9";
        let expr = Parser::parse(source).unwrap();
        let err = numeric(&[1.0, 2.0, 3.0]).evaluate(&expr, source).unwrap_err();
        match &err {
            EvalError::UnknownIdentifier { name, source_text, declared } => {
                assert_eq!(name, "x9");
                assert_eq!(source_text, "x1 + x9");
                assert_eq!(declared, "x1, x2, x3");
            }
        }
        assert!(err.to_string().contains("x9"));
    }

    #[test]
    fn test_symbolic_then_substitute_matches_numeric() {
        let mut problem = NlpProblem::new();
        let symbols: Bindings<Term> = (1..=3)
            .map(|i| {
                let name = format!("x{}", i);
                let term = problem.add_variable(name.clone(), 0.0, 0.0, None);
                (name, term)
            })
            .collect();
        let point = [0.7, -1.25, 2.5];
        let values = numeric(&point);

        for source in [
            "x1**2 + x2**2 + x3**2",
            "(x1-3)**2 + (x2-2)**2",
            "2*x1**2 + x1*x2 - x3/4",
            "-x1**-2 + 1e-3 * (x2 - x3) ** 3",
            "x1 / (x2 + 2) - +x3",
            "7",
        ] {
            let expr = Parser::parse(source).unwrap();
            let term = symbols.evaluate(&expr, source).unwrap();
            let direct = values.evaluate(&expr, source).unwrap();
            assert_relative_eq!(term.eval(&point), direct, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_bind_keeps_first_order() {
        let mut bindings = Bindings::new();
        bindings.bind("x2", 1.0);
        bindings.bind("x1", 2.0);
        bindings.bind("x2", 3.0);
        assert_eq!(bindings.names(), &["x2".to_string(), "x1".to_string()]);
        assert_eq!(bindings.get("x2"), Some(&3.0));
    }
}
