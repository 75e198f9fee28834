use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Index of a decision variable inside an [`crate::NlpProblem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl TermOp {
    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            TermOp::Add => left + right,
            TermOp::Sub => left - right,
            TermOp::Mul => left * right,
            TermOp::Div => left / right,
            TermOp::Pow => left.powf(right),
        }
    }
}

impl fmt::Display for TermOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermOp::Add => write!(f, "+"),
            TermOp::Sub => write!(f, "-"),
            TermOp::Mul => write!(f, "*"),
            TermOp::Div => write!(f, "/"),
            TermOp::Pow => write!(f, "**"),
        }
    }
}

/// Solver-native symbolic expression over declared decision variables.
///
/// Terms are built with the ordinary arithmetic operators, starting from the
/// handles returned by [`crate::NlpProblem::add_variable`] and from
/// [`Term::constant`]. Operations on two constants fold immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Const(f64),
    Var(VarId),
    Neg(Box<Term>),
    Binary {
        op: TermOp,
        left: Box<Term>,
        right: Box<Term>,
    },
}

impl Term {
    pub fn constant(value: f64) -> Self {
        Term::Const(value)
    }

    pub fn var(id: VarId) -> Self {
        Term::Var(id)
    }

    pub fn pow(self, exponent: Term) -> Term {
        Term::binary(TermOp::Pow, self, exponent)
    }

    fn binary(op: TermOp, left: Term, right: Term) -> Term {
        match (&left, &right) {
            (Term::Const(a), Term::Const(b)) => Term::Const(op.apply(*a, *b)),
            _ => Term::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Evaluate at a point. Variables outside `point` evaluate to NaN.
    pub fn eval(&self, point: &[f64]) -> f64 {
        match self {
            Term::Const(value) => *value,
            Term::Var(id) => point.get(id.0).copied().unwrap_or(f64::NAN),
            Term::Neg(inner) => -inner.eval(point),
            Term::Binary { op, left, right } => op.apply(left.eval(point), right.eval(point)),
        }
    }

    /// Variables this term depends on
    pub fn variables(&self) -> BTreeSet<VarId> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<VarId>) {
        match self {
            Term::Const(_) => {}
            Term::Var(id) => {
                out.insert(*id);
            }
            Term::Neg(inner) => inner.collect_variables(out),
            Term::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
        }
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Const(value)
    }
}

impl From<VarId> for Term {
    fn from(id: VarId) -> Self {
        Term::Var(id)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        match self {
            Term::Const(value) => Term::Const(-value),
            Term::Neg(inner) => *inner,
            other => Term::Neg(Box::new(other)),
        }
    }
}

macro_rules! impl_term_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for Term {
            type Output = Term;

            fn $method(self, rhs: Term) -> Term {
                Term::binary($op, self, rhs)
            }
        }

        impl $trait<f64> for Term {
            type Output = Term;

            fn $method(self, rhs: f64) -> Term {
                Term::binary($op, self, Term::Const(rhs))
            }
        }

        impl $trait<Term> for f64 {
            type Output = Term;

            fn $method(self, rhs: Term) -> Term {
                Term::binary($op, Term::Const(self), rhs)
            }
        }
    };
}

impl_term_op!(Add, add, TermOp::Add);
impl_term_op!(Sub, sub, TermOp::Sub);
impl_term_op!(Mul, mul, TermOp::Mul);
impl_term_op!(Div, div, TermOp::Div);

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Const(value) => write!(f, "{}", value),
            Term::Var(id) => write!(f, "{}", id),
            Term::Neg(inner) => write!(f, "-({})", inner),
            Term::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}
