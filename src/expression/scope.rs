//! Parameter scoping checks.

use crate::expression::{Expr, ExprError, ExprKind, ExprResult, Lambda, Parameter};

/// Parameters referenced in `expr` that no lambda inside `expr` binds.
///
/// Results are in first-occurrence order without duplicates.
pub fn free_parameters(expr: &Expr) -> Vec<Parameter> {
    let mut free = Vec::new();
    let mut bound = Vec::new();
    collect_free(expr, &mut bound, &mut free);
    free
}

fn collect_free(expr: &Expr, bound: &mut Vec<Parameter>, free: &mut Vec<Parameter>) {
    match expr.kind() {
        ExprKind::Constant(_) => {}
        ExprKind::Parameter(_) => {
            let is_bound = bound.iter().any(|param| param.as_expr().ptr_eq(expr));
            let is_known = free.iter().any(|param| param.as_expr().ptr_eq(expr));
            if !is_bound && !is_known {
                if let Some(param) = expr.as_parameter() {
                    free.push(param);
                }
            }
        }
        ExprKind::Member { target, .. } => collect_free(target, bound, free),
        ExprKind::Call { target, args, .. } => {
            if let Some(target) = target {
                collect_free(target, bound, free);
            }
            for arg in args {
                collect_free(arg, bound, free);
            }
        }
        ExprKind::Unary { operand, .. } => collect_free(operand, bound, free),
        ExprKind::Binary { left, right, .. } => {
            collect_free(left, bound, free);
            collect_free(right, bound, free);
        }
        ExprKind::Lambda(lambda) => {
            let depth = bound.len();
            bound.extend(lambda.params().iter().cloned());
            collect_free(lambda.body(), bound, free);
            bound.truncate(depth);
        }
    }
}

impl Lambda {
    /// Parameters the body uses without this lambda declaring them
    pub fn unbound_parameters(&self) -> Vec<Parameter> {
        free_parameters(self.body())
            .into_iter()
            .filter(|param| !self.params().iter().any(|own| own.ptr_eq(param)))
            .collect()
    }

    /// Fail unless the body references only this lambda's own parameters
    pub fn check_closed(&self) -> ExprResult<()> {
        match self.unbound_parameters().first() {
            None => Ok(()),
            Some(param) => Err(ExprError::invalid_shape(
                "lambda",
                format!("body of {} references undeclared parameter {}", self, param),
            )),
        }
    }
}
