//! Lifting element predicates to entity predicates through a collection.

use crate::expression::{
    Expr, ExprError, ExprResult, Lambda, Method, Quantifier, TypeRef, Value,
};
use log::debug;

/// `e => selector(e).Any(predicate)`
pub fn any(selector: &Lambda, predicate: &Lambda) -> ExprResult<Lambda> {
    quantify(Quantifier::Any, selector, predicate)
}

/// `e => selector(e).All(predicate)`
pub fn all(selector: &Lambda, predicate: &Lambda) -> ExprResult<Lambda> {
    quantify(Quantifier::All, selector, predicate)
}

/// `e => selector(e).Contains(value)`
pub fn contains(selector: &Lambda, value: impl Into<Value>) -> ExprResult<Lambda> {
    let value = value.into();
    let element = collection_element(selector)?;

    let value_type = value.data_type().ok_or_else(|| {
        ExprError::ShapeMismatch(format!(
            "Contains needs a scalar or record value, got {}",
            value
        ))
    })?;
    if !element.is_assignable_from(&value_type) {
        return Err(ExprError::ShapeMismatch(format!(
            "value {} of type {} cannot be an element of {}",
            value,
            value_type,
            selector.result_type()
        )));
    }

    let constant = Expr::constant(value)?;
    sequence_call(Quantifier::Contains, selector, element, constant)
}

fn quantify(quantifier: Quantifier, selector: &Lambda, predicate: &Lambda) -> ExprResult<Lambda> {
    let element = collection_element(selector)?;

    let param = match predicate.params() {
        [param] => param,
        params => {
            return Err(ExprError::ShapeMismatch(format!(
                "{} predicate must take exactly one parameter, got {}",
                quantifier,
                params.len()
            )))
        }
    };
    if !param.ty().is_assignable_from(element) {
        return Err(ExprError::ShapeMismatch(format!(
            "{} predicate over {} cannot accept elements of {}",
            quantifier,
            param.ty(),
            selector.result_type()
        )));
    }
    if !predicate.result_type().is_boolean() {
        return Err(ExprError::ShapeMismatch(format!(
            "{} predicate must return Boolean, got {}",
            quantifier,
            predicate.result_type()
        )));
    }

    // The predicate keeps its own parameter; the call binds it per element
    sequence_call(quantifier, selector, param.ty(), predicate.to_expr())
}

fn collection_element(selector: &Lambda) -> ExprResult<&TypeRef> {
    selector.result_type().element_type().ok_or_else(|| {
        ExprError::ShapeMismatch(format!(
            "collection selector must return a sequence, got {}",
            selector.result_type()
        ))
    })
}

fn sequence_call(
    quantifier: Quantifier,
    selector: &Lambda,
    element: &TypeRef,
    operand: Expr,
) -> ExprResult<Lambda> {
    let call = Expr::call(
        None,
        Method::sequence(quantifier, element),
        vec![selector.body().clone(), operand],
    )?;
    let lifted = Lambda::new(selector.params().to_vec(), call)?;

    debug!("lifted {} with {} into {}", selector, quantifier, lifted);
    Ok(lifted)
}

impl Lambda {
    pub fn any(&self, predicate: &Lambda) -> ExprResult<Lambda> {
        any(self, predicate)
    }

    pub fn all(&self, predicate: &Lambda) -> ExprResult<Lambda> {
        all(self, predicate)
    }

    pub fn contains(&self, value: impl Into<Value>) -> ExprResult<Lambda> {
        contains(self, value)
    }
}
