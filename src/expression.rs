//! Expression tree representation.
//!
//! This module provides:
//! - Typed, identity-bearing expression nodes and lambdas
//! - Operator and type definitions with construction-time validation
//! - A rewriting visitor that replaces nodes by identity
//! - Scope analysis, a printer and a small interpreter

pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod print;
pub mod scope;
pub mod types;
pub mod visitor;

pub use error::{ExprError, ExprResult};
pub use eval::{Evaluator, NativeFunction};
pub use expr::{CallStyle, Expr, ExprKind, Lambda, Method, Parameter, ParameterInfo};
pub use operator::{BinaryOperator, Quantifier, UnaryOperator};
pub use scope::free_parameters;
pub use types::{Record, TypeRef, Value};
pub use visitor::{replace, walk_children, walk_lambda, ExprRewriter, ReplaceVisitor};
