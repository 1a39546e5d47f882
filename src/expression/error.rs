//! Error types for building, rewriting and composing expression trees.

use thiserror::Error;

/// Errors raised by node construction, rewriting and the combinators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// A required lambda or node argument was not supplied
    #[error("Missing argument: {0}")]
    ArgumentMissing(&'static str),

    /// Parameter arity/type mismatch between the trees being combined
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Operation outside the supported set
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A node could not be built from the given children
    #[error("Invalid {node} node: {reason}")]
    InvalidShape { node: &'static str, reason: String },

    /// Interpreting a tree failed
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

impl ExprError {
    pub(crate) fn invalid_shape(node: &'static str, reason: impl Into<String>) -> Self {
        ExprError::InvalidShape {
            node,
            reason: reason.into(),
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        ExprError::Evaluation(message.into())
    }
}

/// Result type for expression operations
pub type ExprResult<T> = Result<T, ExprError>;
