pub mod ast;
pub mod builder;
pub mod codegen;
pub mod error;
pub mod eval;
pub mod input;
pub mod lexer;
pub mod parser;
pub mod presets;
pub mod relation;
pub mod report;

pub use ast::*;
pub use builder::{solve, CompiledConstraint, CompiledModel, ModelBuilder, ParsedExpr};
pub use codegen::Target;
pub use error::{Error, InputError};
pub use eval::{evaluate_str, Bindings, EvalError, Operand};
pub use input::{Bound, ProblemSpec, MAX_CONSTRAINTS, MAX_VARIABLES};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser, MAX_DEPTH};
pub use relation::{split_constraint, FormatError, SplitConstraint};
pub use report::{is_satisfied, ConstraintCheck, Report, VariableValue, SATISFACTION_TOLERANCE};
