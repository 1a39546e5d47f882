//! Rewriting traversal over expression trees.
//!
//! `ExprRewriter` walks a tree and rebuilds every composite node from its
//! rewritten children through the validating constructors, so a rewrite that
//! breaks a parent's typing fails with `ExprError::InvalidShape`. Leaves are
//! returned as-is, which keeps untouched parameters identical to the originals.

use crate::expression::{Expr, ExprKind, ExprResult, Lambda, Parameter};
use log::trace;

/// Visitor that produces a rewritten copy of a tree.
///
/// Implementors override `visit` to intercept nodes and fall back to
/// [`walk_children`] for everything they leave alone.
pub trait ExprRewriter {
    /// Rewrite `node` and everything beneath it
    fn visit(&self, node: &Expr) -> ExprResult<Expr> {
        walk_children(self, node)
    }

    /// Rewrite a lambda's parameter list and body
    fn visit_lambda(&self, lambda: &Lambda) -> ExprResult<Lambda> {
        walk_lambda(self, lambda)
    }
}

/// Rebuild `node` from its visited children
pub fn walk_children<R: ExprRewriter + ?Sized>(rewriter: &R, node: &Expr) -> ExprResult<Expr> {
    match node.kind() {
        ExprKind::Constant(_) | ExprKind::Parameter(_) => Ok(node.clone()),

        ExprKind::Member { target, name } => {
            Expr::member(rewriter.visit(target)?, name.clone(), node.ty().clone())
        }

        ExprKind::Call {
            target,
            method,
            args,
        } => {
            let target = target
                .as_ref()
                .map(|target| rewriter.visit(target))
                .transpose()?;
            let args = args
                .iter()
                .map(|arg| rewriter.visit(arg))
                .collect::<ExprResult<Vec<_>>>()?;
            Expr::call(target, method.clone(), args)
        }

        ExprKind::Unary { op, operand } => Expr::unary(*op, rewriter.visit(operand)?),

        ExprKind::Binary { op, left, right } => {
            Expr::binary(*op, rewriter.visit(left)?, rewriter.visit(right)?)
        }

        ExprKind::Lambda(lambda) => Ok(rewriter.visit_lambda(lambda)?.into()),
    }
}

/// Rebuild a lambda from its visited parameters and body.
///
/// A parameter rewritten into anything but a parameter node is rejected.
pub fn walk_lambda<R: ExprRewriter + ?Sized>(rewriter: &R, lambda: &Lambda) -> ExprResult<Lambda> {
    let params = lambda
        .params()
        .iter()
        .map(|param| Parameter::try_from(rewriter.visit(param.as_expr())?))
        .collect::<ExprResult<Vec<_>>>()?;
    let body = rewriter.visit(lambda.body())?;
    Lambda::new(params, body)
}

/// Replaces every occurrence of one node instance with another
#[derive(Clone)]
pub struct ReplaceVisitor {
    replace_from: Expr,
    replace_to: Expr,
}

impl ReplaceVisitor {
    pub fn new(replace_from: Expr, replace_to: Expr) -> Self {
        Self {
            replace_from,
            replace_to,
        }
    }

    pub fn replace_from(&self) -> &Expr {
        &self.replace_from
    }

    pub fn replace_to(&self) -> &Expr {
        &self.replace_to
    }
}

impl ExprRewriter for ReplaceVisitor {
    fn visit(&self, node: &Expr) -> ExprResult<Expr> {
        // Matched by identity only, never by structure
        if node.ptr_eq(&self.replace_from) {
            trace!("replacing {} with {}", self.replace_from, self.replace_to);
            return Ok(self.replace_to.clone());
        }
        walk_children(self, node)
    }
}

/// Copy `tree` with every occurrence of `from` replaced by `to`
pub fn replace(tree: &Expr, from: &Expr, to: &Expr) -> ExprResult<Expr> {
    ReplaceVisitor::new(from.clone(), to.clone()).visit(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{ExprError, TypeRef};

    fn order() -> TypeRef {
        TypeRef::entity("Order")
    }

    #[test]
    fn test_replace_lambda_parameter() {
        let x = Parameter::named(order(), "x");
        let body = Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap();
        let lambda = Lambda::new(vec![x.clone()], body).unwrap();

        let replace_to = Parameter::named(order(), "x");
        let replacer = ReplaceVisitor::new(x.to_expr(), replace_to.to_expr());

        let replaced = replacer.visit_lambda(&lambda).unwrap();

        assert!(replaced.params()[0].ptr_eq(&replace_to));
        match replaced.body().kind() {
            ExprKind::Member { target, .. } => assert!(target.ptr_eq(replace_to.as_expr())),
            other => panic!("expected member access, got {:?}", other),
        }

        // Input untouched
        assert!(lambda.params()[0].ptr_eq(&x));
        assert_eq!(lambda.body().occurrences_of(x.as_expr()), 1);
    }

    #[test]
    fn test_identity_not_structure() {
        let x = Parameter::named(order(), "x");
        let first = Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap();
        let second = Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap();
        let tree = Expr::eq(first.clone(), second).unwrap();

        let replaced = replace(&tree, &first, &Expr::int32(7)).unwrap();
        assert_eq!(replaced.to_string(), "(7 == x.Total)");
    }

    #[test]
    fn test_no_occurrence_rebuilds_same_shape() {
        let x = Parameter::named(order(), "x");
        let tree = Expr::gt(
            Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap(),
            Expr::int32(10),
        )
        .unwrap();

        let unrelated = Parameter::named(order(), "y");
        let copy = replace(&tree, unrelated.as_expr(), &Expr::int32(0)).unwrap();

        assert!(!copy.ptr_eq(&tree));
        assert_eq!(copy.to_string(), tree.to_string());
        assert_eq!(copy.occurrences_of(x.as_expr()), 1);
    }

    #[test]
    fn test_leaf_is_returned_as_is() {
        let leaf = Expr::int32(3);
        let other = Expr::int32(3);
        let copy = replace(&leaf, &other, &Expr::int32(4)).unwrap();
        assert!(copy.ptr_eq(&leaf));
    }

    #[test]
    fn test_replacement_breaking_parent_type() {
        let flag = Parameter::named(TypeRef::Boolean, "flag");
        let tree = Expr::and_also(flag.to_expr(), Expr::boolean(true)).unwrap();

        let err = replace(&tree, flag.as_expr(), &Expr::int32(1)).unwrap_err();
        assert!(matches!(err, ExprError::InvalidShape { node: "binary", .. }));
    }

    #[test]
    fn test_replacement_breaking_member_target() {
        let x = Parameter::named(order(), "x");
        let tree = Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap();

        let err = replace(&tree, x.as_expr(), &Expr::int32(1)).unwrap_err();
        assert!(matches!(err, ExprError::InvalidShape { node: "member", .. }));

        // Any other entity-typed node is still a valid target
        let y = Parameter::named(TypeRef::entity("Customer"), "y");
        let moved = replace(&tree, x.as_expr(), y.as_expr()).unwrap();
        assert_eq!(moved.to_string(), "y.Total");
    }

    #[test]
    fn test_lambda_parameter_replaced_by_non_parameter() {
        let x = Parameter::named(TypeRef::Int32, "x");
        let lambda = Lambda::new(vec![x.clone()], Expr::gt(x.to_expr(), Expr::int32(0)).unwrap())
            .unwrap();

        let err = replace(&lambda.to_expr(), x.as_expr(), &Expr::int32(5)).unwrap_err();
        assert!(matches!(err, ExprError::InvalidShape { node: "lambda", .. }));
    }

    #[test]
    fn test_visitor_is_reusable() {
        let x = Parameter::named(TypeRef::Int32, "x");
        let to = Parameter::named(TypeRef::Int32, "y");
        let replacer = ReplaceVisitor::new(x.to_expr(), to.to_expr());

        let first = replacer
            .visit(&Expr::add_expr(x.to_expr(), Expr::int32(1)).unwrap())
            .unwrap();
        let second = replacer
            .visit(&Expr::gt(x.to_expr(), Expr::int32(2)).unwrap())
            .unwrap();

        assert_eq!(first.to_string(), "(y + 1)");
        assert_eq!(second.to_string(), "(y > 2)");
    }
}
