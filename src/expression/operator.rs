//! Operator definitions for expressions.

use crate::expression::TypeRef;
use serde::{Deserialize, Serialize};

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Short-circuiting logical
    AndAlso,
    OrElse,
}

impl BinaryOperator {
    /// Get the output type of this operator given operand types
    pub fn output_type(&self, left: &TypeRef, right: &TypeRef) -> Option<TypeRef> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div => match (left, right) {
                (TypeRef::Int32, TypeRef::Int32) => Some(TypeRef::Int32),
                _ => None,
            },

            // Equality needs one side assignable to the other, so an `Object`
            // operand compares against anything
            BinaryOperator::Eq | BinaryOperator::Ne => {
                if left.is_assignable_from(right) || right.is_assignable_from(left) {
                    Some(TypeRef::Boolean)
                } else {
                    None
                }
            }

            // Ordering only on scalars
            BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => {
                match (left, right) {
                    (TypeRef::Int32, TypeRef::Int32) | (TypeRef::String, TypeRef::String) => {
                        Some(TypeRef::Boolean)
                    }
                    _ => None,
                }
            }

            BinaryOperator::AndAlso | BinaryOperator::OrElse => match (left, right) {
                (TypeRef::Boolean, TypeRef::Boolean) => Some(TypeRef::Boolean),
                _ => None,
            },
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::AndAlso | BinaryOperator::OrElse)
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::AndAlso => "&&",
            BinaryOperator::OrElse => "||",
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl UnaryOperator {
    /// Get the output type of this operator given operand type
    pub fn output_type(&self, operand: &TypeRef) -> Option<TypeRef> {
        match (self, operand) {
            (UnaryOperator::Not, TypeRef::Boolean) => Some(TypeRef::Boolean),
            (UnaryOperator::Negate, TypeRef::Int32) => Some(TypeRef::Int32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
        }
    }
}

/// Built-in sequence operators the interpreter knows natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    /// Some element satisfies a predicate
    Any,
    /// Every element satisfies a predicate
    All,
    /// Some element equals a value
    Contains,
}

impl Quantifier {
    pub fn method_name(&self) -> &'static str {
        match self {
            Quantifier::Any => "Any",
            Quantifier::All => "All",
            Quantifier::Contains => "Contains",
        }
    }

    /// Parameter types of the operator instantiated for `element`
    pub fn parameter_types(&self, element: &TypeRef) -> Vec<TypeRef> {
        let source = TypeRef::sequence(element.clone());
        match self {
            Quantifier::Any | Quantifier::All => vec![
                source,
                TypeRef::function(vec![element.clone()], TypeRef::Boolean),
            ],
            Quantifier::Contains => vec![source, element.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_operator_output_types() {
        assert_eq!(
            BinaryOperator::Add.output_type(&TypeRef::Int32, &TypeRef::Int32),
            Some(TypeRef::Int32)
        );
        assert_eq!(
            BinaryOperator::Add.output_type(&TypeRef::Int32, &TypeRef::String),
            None
        );

        assert_eq!(
            BinaryOperator::Eq.output_type(&TypeRef::entity("A"), &TypeRef::entity("A")),
            Some(TypeRef::Boolean)
        );
        assert_eq!(
            BinaryOperator::Eq.output_type(&TypeRef::Int32, &TypeRef::Boolean),
            None
        );
        assert_eq!(
            BinaryOperator::Eq.output_type(&TypeRef::entity("A"), &TypeRef::Object),
            Some(TypeRef::Boolean)
        );
        assert_eq!(
            BinaryOperator::Ne.output_type(&TypeRef::Object, &TypeRef::Int32),
            Some(TypeRef::Boolean)
        );
        assert_eq!(
            BinaryOperator::Eq.output_type(&TypeRef::entity("A"), &TypeRef::entity("B")),
            None
        );
        assert_eq!(
            BinaryOperator::Lt.output_type(&TypeRef::String, &TypeRef::String),
            Some(TypeRef::Boolean)
        );
        assert_eq!(
            BinaryOperator::Lt.output_type(&TypeRef::Boolean, &TypeRef::Boolean),
            None
        );

        assert_eq!(
            BinaryOperator::AndAlso.output_type(&TypeRef::Boolean, &TypeRef::Boolean),
            Some(TypeRef::Boolean)
        );
        assert_eq!(
            BinaryOperator::OrElse.output_type(&TypeRef::Int32, &TypeRef::Boolean),
            None
        );
    }

    #[test]
    fn test_unary_operator_output_types() {
        assert_eq!(
            UnaryOperator::Not.output_type(&TypeRef::Boolean),
            Some(TypeRef::Boolean)
        );
        assert_eq!(UnaryOperator::Not.output_type(&TypeRef::Int32), None);
        assert_eq!(
            UnaryOperator::Negate.output_type(&TypeRef::Int32),
            Some(TypeRef::Int32)
        );
    }

    #[test]
    fn test_quantifier_signatures() {
        let item = TypeRef::entity("Item");
        assert_eq!(
            Quantifier::Any.parameter_types(&item),
            vec![
                TypeRef::sequence(item.clone()),
                TypeRef::function(vec![item.clone()], TypeRef::Boolean)
            ]
        );
        assert_eq!(
            Quantifier::Contains.parameter_types(&TypeRef::Int32),
            vec![TypeRef::sequence(TypeRef::Int32), TypeRef::Int32]
        );
        assert_eq!(Quantifier::All.method_name(), "All");
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(BinaryOperator::AndAlso.as_str(), "&&");
        assert_eq!(BinaryOperator::OrElse.as_str(), "||");
        assert_eq!(BinaryOperator::Eq.as_str(), "==");
        assert_eq!(UnaryOperator::Not.as_str(), "!");
        assert!(BinaryOperator::OrElse.is_logical());
        assert!(!BinaryOperator::Eq.is_logical());
    }

    #[test]
    fn test_serialization() {
        for quantifier in [Quantifier::Any, Quantifier::All, Quantifier::Contains] {
            let bytes = bincode::serialize(&quantifier).unwrap();
            assert_eq!(bincode::deserialize::<Quantifier>(&bytes).unwrap(), quantifier);
        }

        let bytes = bincode::serialize(&BinaryOperator::OrElse).unwrap();
        assert_eq!(
            bincode::deserialize::<BinaryOperator>(&bytes).unwrap(),
            BinaryOperator::OrElse
        );
    }
}
