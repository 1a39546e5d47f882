//! Logical join of predicates.
//!
//! Two predicates built independently never share parameter nodes, so
//! joining them allocates one fresh parameter per position and rewrites both
//! bodies onto it before connecting them with `&&` or `||`.

use crate::expression::{
    BinaryOperator, Expr, ExprError, ExprResult, ExprRewriter, Lambda, Parameter, ReplaceVisitor,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connective used to join two predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOperation {
    And,
    Or,
}

impl LogicalOperation {
    /// Short-circuiting operator this operation builds
    pub fn binary_operator(&self) -> BinaryOperator {
        match self {
            LogicalOperation::And => BinaryOperator::AndAlso,
            LogicalOperation::Or => BinaryOperator::OrElse,
        }
    }
}

impl TryFrom<BinaryOperator> for LogicalOperation {
    type Error = ExprError;

    fn try_from(op: BinaryOperator) -> ExprResult<Self> {
        match op {
            BinaryOperator::AndAlso => Ok(LogicalOperation::And),
            BinaryOperator::OrElse => Ok(LogicalOperation::Or),
            other => Err(ExprError::Unsupported(format!(
                "{} is not a logical operator",
                other
            ))),
        }
    }
}

impl FromStr for LogicalOperation {
    type Err = ExprError;

    fn from_str(s: &str) -> ExprResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "and" | "&&" => Ok(LogicalOperation::And),
            "or" | "||" => Ok(LogicalOperation::Or),
            _ => Err(ExprError::Unsupported(format!(
                "unknown logical operation '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for LogicalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperation::And => write!(f, "AND"),
            LogicalOperation::Or => write!(f, "OR"),
        }
    }
}

/// Join two predicates with `op`.
///
/// A missing side is not treated as `true` or `false`: the other side is
/// returned unchanged, which lets callers fold optional filters together.
pub fn join(
    left: Option<&Lambda>,
    right: Option<&Lambda>,
    op: LogicalOperation,
) -> ExprResult<Option<Lambda>> {
    match (left, right) {
        (None, right) => Ok(right.cloned()),
        (left, None) => Ok(left.cloned()),
        (Some(left), Some(right)) => join_lambdas(left, right, op).map(Some),
    }
}

/// Join two predicates with a short-circuiting operator given as a `BinaryOperator`
pub fn join_with_operator(
    left: Option<&Lambda>,
    right: Option<&Lambda>,
    op: BinaryOperator,
) -> ExprResult<Option<Lambda>> {
    join(left, right, LogicalOperation::try_from(op)?)
}

pub fn and(left: Option<&Lambda>, right: Option<&Lambda>) -> ExprResult<Option<Lambda>> {
    join(left, right, LogicalOperation::And)
}

pub fn or(left: Option<&Lambda>, right: Option<&Lambda>) -> ExprResult<Option<Lambda>> {
    join(left, right, LogicalOperation::Or)
}

fn join_lambdas(left: &Lambda, right: &Lambda, op: LogicalOperation) -> ExprResult<Lambda> {
    if !left.parameter_types().eq(right.parameter_types()) {
        return Err(ExprError::ShapeMismatch(format!(
            "parameters of left predicate must match parameters of right predicate: {} vs {}",
            left.ty(),
            right.ty()
        )));
    }

    // Left-hand names survive for readability of the result
    let fresh: Vec<Parameter> = left
        .params()
        .iter()
        .map(|param| Parameter::new(param.ty().clone(), param.name()))
        .collect();

    let mut left_body = left.body().clone();
    let mut right_body = right.body().clone();

    for ((left_param, right_param), target) in left
        .params()
        .iter()
        .zip(right.params().iter())
        .zip(fresh.iter())
    {
        let left_replacer = ReplaceVisitor::new(left_param.to_expr(), target.to_expr());
        let right_replacer = ReplaceVisitor::new(right_param.to_expr(), target.to_expr());

        left_body = left_replacer.visit(&left_body)?;
        right_body = right_replacer.visit(&right_body)?;
    }

    let body = Expr::binary(op.binary_operator(), left_body, right_body)?;
    let joined = Lambda::new(fresh, body)?;

    debug!("joined {} {} {} into {}", left, op, right, joined);
    Ok(joined)
}

impl Lambda {
    /// `self && other` over unified parameters
    pub fn and(&self, other: &Lambda) -> ExprResult<Lambda> {
        join_lambdas(self, other, LogicalOperation::And)
    }

    /// `self || other` over unified parameters
    pub fn or(&self, other: &Lambda) -> ExprResult<Lambda> {
        join_lambdas(self, other, LogicalOperation::Or)
    }
}
