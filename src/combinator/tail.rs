//! Tail splicing: `e => a(e)` followed by `a => r(a)` becomes `e => r(a(e))`.

use crate::expression::{ExprError, ExprResult, ExprRewriter, Lambda, ReplaceVisitor};
use log::debug;

/// Splice `continuation` onto the end of `selector`.
///
/// Every use of the continuation's parameter is replaced by the selector's
/// body itself; no binding is introduced, so a parameter used twice yields
/// the selector body twice.
pub fn add_tail(selector: Option<&Lambda>, continuation: Option<&Lambda>) -> ExprResult<Lambda> {
    let selector = selector.ok_or(ExprError::ArgumentMissing("selector"))?;
    let continuation = continuation.ok_or(ExprError::ArgumentMissing("continuation"))?;

    let param = match continuation.params() {
        [param] if param.ty().is_assignable_from(selector.result_type()) => param,
        _ => {
            return Err(ExprError::ShapeMismatch(format!(
                "continuation must take one parameter assignable from {}, got {}",
                selector.result_type(),
                continuation.ty()
            )))
        }
    };

    let replacer = ReplaceVisitor::new(param.to_expr(), selector.body().clone());
    let body = replacer.visit(continuation.body())?;
    let spliced = Lambda::new(selector.params().to_vec(), body)?;

    debug!("spliced {} onto {} giving {}", continuation, selector, spliced);
    Ok(spliced)
}

impl Lambda {
    pub fn add_tail(&self, continuation: &Lambda) -> ExprResult<Lambda> {
        add_tail(Some(self), Some(continuation))
    }
}
