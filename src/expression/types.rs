//! Declared types and values carried by expression trees.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared type of an expression node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Boolean,
    Int32,
    String,
    /// Top type; every other type is assignable to it
    Object,
    /// Named entity type exposing members
    Entity(String),
    /// Sequence of elements
    Sequence(Box<TypeRef>),
    /// Type of a lambda
    Function {
        params: Vec<TypeRef>,
        result: Box<TypeRef>,
    },
}

impl TypeRef {
    pub fn entity(name: impl Into<String>) -> Self {
        TypeRef::Entity(name.into())
    }

    pub fn sequence(element: TypeRef) -> Self {
        TypeRef::Sequence(Box::new(element))
    }

    pub fn function(params: Vec<TypeRef>, result: TypeRef) -> Self {
        TypeRef::Function {
            params,
            result: Box::new(result),
        }
    }

    /// Element type if this is a sequence
    pub fn element_type(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// Entities, strings and `Object` can be the target of a member access
    pub fn has_members(&self) -> bool {
        matches!(self, TypeRef::Entity(_) | TypeRef::String | TypeRef::Object)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeRef::Boolean)
    }

    /// Check whether a value of type `other` may be used where `self` is expected
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        if self == other {
            return true;
        }

        match (self, other) {
            (TypeRef::Object, _) => true,
            (TypeRef::Sequence(expected), TypeRef::Sequence(actual)) => {
                expected.is_assignable_from(actual)
            }
            (
                TypeRef::Function {
                    params: expected_params,
                    result: expected_result,
                },
                TypeRef::Function {
                    params: actual_params,
                    result: actual_result,
                },
            ) => {
                expected_params.len() == actual_params.len()
                    && expected_params
                        .iter()
                        .zip(actual_params.iter())
                        .all(|(expected, actual)| actual.is_assignable_from(expected))
                    && expected_result.is_assignable_from(actual_result)
            }
            _ => false,
        }
    }
}

/// An entity instance: a type name plus its member values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: String,
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Values that constants hold and the interpreter produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    String(String),
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    /// Get the declared type of this value, if it can be determined
    pub fn data_type(&self) -> Option<TypeRef> {
        match self {
            Value::Boolean(_) => Some(TypeRef::Boolean),
            Value::Int32(_) => Some(TypeRef::Int32),
            Value::String(_) => Some(TypeRef::String),
            Value::Record(record) => Some(TypeRef::Entity(record.type_name.clone())),
            // Element type of a list is not recorded
            Value::List(_) => None,
        }
    }

    /// Scalars are the only values a constant node may hold
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Boolean(_) | Value::Int32(_) | Value::String(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}
