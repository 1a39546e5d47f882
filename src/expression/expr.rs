//! Expression tree definitions.
//!
//! Nodes are immutable and shared through `Arc`. Two nodes are the same node
//! only when they are the same allocation: parameters created independently
//! are distinct even when their type and name agree.

use crate::expression::{
    BinaryOperator, ExprError, ExprResult, Quantifier, TypeRef, UnaryOperator, Value,
};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(0);

/// How a method is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStyle {
    /// Free function, no target
    Static,
    /// Called on a target value
    Instance,
    /// Static function whose first argument reads as the receiver
    Extension,
}

/// Callee of a call node
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    name: String,
    style: CallStyle,
    params: Vec<TypeRef>,
    result: TypeRef,
    intrinsic: Option<Quantifier>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        style: CallStyle,
        params: Vec<TypeRef>,
        result: TypeRef,
    ) -> Self {
        Self {
            name: name.into(),
            style,
            params,
            result,
            intrinsic: None,
        }
    }

    pub fn instance(name: impl Into<String>, params: Vec<TypeRef>, result: TypeRef) -> Self {
        Self::new(name, CallStyle::Instance, params, result)
    }

    pub fn static_fn(name: impl Into<String>, params: Vec<TypeRef>, result: TypeRef) -> Self {
        Self::new(name, CallStyle::Static, params, result)
    }

    /// A built-in sequence operator instantiated for `element`
    pub fn sequence(quantifier: Quantifier, element: &TypeRef) -> Self {
        Self {
            name: quantifier.method_name().to_string(),
            style: CallStyle::Extension,
            params: quantifier.parameter_types(element),
            result: TypeRef::Boolean,
            intrinsic: Some(quantifier),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> CallStyle {
        self.style
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    pub fn result(&self) -> &TypeRef {
        &self.result
    }

    pub fn intrinsic(&self) -> Option<Quantifier> {
        self.intrinsic
    }
}

/// Payload of a parameter node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Process-unique id, for diagnostics only
    pub id: u64,
    pub name: Option<String>,
}

/// Expression tree node kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Scalar or record constant
    Constant(Value),

    /// Bound variable
    Parameter(ParameterInfo),

    /// Member access `target.name`
    Member { target: Expr, name: String },

    /// Method call
    Call {
        target: Option<Expr>,
        method: Method,
        args: Vec<Expr>,
    },

    /// Unary operation
    Unary { op: UnaryOperator, operand: Expr },

    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Expr,
        right: Expr,
    },

    /// Nested lambda, e.g. a predicate passed to a sequence operator
    Lambda(Lambda),
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Constant(_) => "constant",
            ExprKind::Parameter(_) => "parameter",
            ExprKind::Member { .. } => "member",
            ExprKind::Call { .. } => "call",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Lambda(_) => "lambda",
        }
    }
}

#[derive(Debug)]
struct Node {
    kind: ExprKind,
    ty: TypeRef,
}

/// Shared handle to an immutable expression node
#[derive(Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    fn new(kind: ExprKind, ty: TypeRef) -> Self {
        Expr(Arc::new(Node { kind, ty }))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Declared type of the value this node produces
    pub fn ty(&self) -> &TypeRef {
        &self.0.ty
    }

    /// Reference identity
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// View this node as a parameter, if it is one
    pub fn as_parameter(&self) -> Option<Parameter> {
        match self.kind() {
            ExprKind::Parameter(_) => Some(Parameter(self.clone())),
            _ => None,
        }
    }

    /// Create a constant node holding a scalar or a record.
    ///
    /// Lists are rejected: their element type is not recorded.
    pub fn constant(value: impl Into<Value>) -> ExprResult<Self> {
        let value = value.into();
        match value.data_type() {
            Some(ty) => Ok(Self::new(ExprKind::Constant(value), ty)),
            None => Err(ExprError::invalid_shape(
                "constant",
                format!("{} has no declared type", value),
            )),
        }
    }

    pub fn int32(value: i32) -> Self {
        Self::new(ExprKind::Constant(Value::Int32(value)), TypeRef::Int32)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Constant(Value::Boolean(value)), TypeRef::Boolean)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Constant(Value::String(value.into())), TypeRef::String)
    }

    /// Create a member access of declared type `ty`; the target must be of a
    /// type that exposes members
    pub fn member(target: Expr, name: impl Into<String>, ty: TypeRef) -> ExprResult<Self> {
        let name = name.into();
        if !target.ty().has_members() {
            return Err(ExprError::invalid_shape(
                "member",
                format!("{} of type {} has no member {}", target, target.ty(), name),
            ));
        }
        Ok(Self::new(ExprKind::Member { target, name }, ty))
    }

    /// Create a call node, checking the target and arguments against `method`
    pub fn call(target: Option<Expr>, method: Method, args: Vec<Expr>) -> ExprResult<Self> {
        match (method.style(), &target) {
            (CallStyle::Instance, None) => {
                return Err(ExprError::invalid_shape(
                    "call",
                    format!("instance method {} requires a target", method.name()),
                ))
            }
            (CallStyle::Static | CallStyle::Extension, Some(_)) => {
                return Err(ExprError::invalid_shape(
                    "call",
                    format!("static method {} cannot have a target", method.name()),
                ))
            }
            _ => {}
        }

        if method.style() == CallStyle::Extension && method.params().is_empty() {
            return Err(ExprError::invalid_shape(
                "call",
                format!("extension method {} has no receiver parameter", method.name()),
            ));
        }

        if args.len() != method.params().len() {
            return Err(ExprError::invalid_shape(
                "call",
                format!(
                    "method {} expects {} arguments, got {}",
                    method.name(),
                    method.params().len(),
                    args.len()
                ),
            ));
        }

        for (index, (param, arg)) in method.params().iter().zip(args.iter()).enumerate() {
            if !param.is_assignable_from(arg.ty()) {
                return Err(ExprError::invalid_shape(
                    "call",
                    format!(
                        "argument {} of {} has type {}, expected {}",
                        index,
                        method.name(),
                        arg.ty(),
                        param
                    ),
                ));
            }
        }

        let ty = method.result().clone();
        Ok(Self::new(
            ExprKind::Call {
                target,
                method,
                args,
            },
            ty,
        ))
    }

    /// Create a unary operation node
    pub fn unary(op: UnaryOperator, operand: Expr) -> ExprResult<Self> {
        let ty = op.output_type(operand.ty()).ok_or_else(|| {
            ExprError::invalid_shape(
                "unary",
                format!("operator {} does not accept {}", op.as_str(), operand.ty()),
            )
        })?;
        Ok(Self::new(ExprKind::Unary { op, operand }, ty))
    }

    /// Create a binary operation node
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> ExprResult<Self> {
        let ty = op.output_type(left.ty(), right.ty()).ok_or_else(|| {
            ExprError::invalid_shape(
                "binary",
                format!(
                    "operator {} does not accept {} and {}",
                    op.as_str(),
                    left.ty(),
                    right.ty()
                ),
            )
        })?;
        Ok(Self::new(ExprKind::Binary { op, left, right }, ty))
    }

    /// Create a short-circuiting AND expression
    pub fn and_also(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::AndAlso, left, right)
    }

    /// Create a short-circuiting OR expression
    pub fn or_else(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::OrElse, left, right)
    }

    pub fn not_expr(operand: Expr) -> ExprResult<Self> {
        Self::unary(UnaryOperator::Not, operand)
    }

    pub fn eq(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::Lt, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::Gt, left, right)
    }

    pub fn add_expr(left: Expr, right: Expr) -> ExprResult<Self> {
        Self::binary(BinaryOperator::Add, left, right)
    }

    /// Number of node occurrences, counting shared subtrees once per use
    pub fn node_count(&self) -> usize {
        1 + match self.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) => 0,
            ExprKind::Member { target, .. } => target.node_count(),
            ExprKind::Call { target, args, .. } => {
                target.as_ref().map_or(0, Expr::node_count)
                    + args.iter().map(Expr::node_count).sum::<usize>()
            }
            ExprKind::Unary { operand, .. } => operand.node_count(),
            ExprKind::Binary { left, right, .. } => left.node_count() + right.node_count(),
            ExprKind::Lambda(lambda) => {
                lambda.params().len() + lambda.body().node_count()
            }
        }
    }

    /// Count the places where `node` itself appears in this tree
    pub fn occurrences_of(&self, node: &Expr) -> usize {
        if self.ptr_eq(node) {
            return 1;
        }
        match self.kind() {
            ExprKind::Constant(_) | ExprKind::Parameter(_) => 0,
            ExprKind::Member { target, .. } => target.occurrences_of(node),
            ExprKind::Call { target, args, .. } => {
                target.as_ref().map_or(0, |t| t.occurrences_of(node))
                    + args.iter().map(|arg| arg.occurrences_of(node)).sum::<usize>()
            }
            ExprKind::Unary { operand, .. } => operand.occurrences_of(node),
            ExprKind::Binary { left, right, .. } => {
                left.occurrences_of(node) + right.occurrences_of(node)
            }
            ExprKind::Lambda(lambda) => {
                lambda
                    .params()
                    .iter()
                    .filter(|param| param.as_expr().ptr_eq(node))
                    .count()
                    + lambda.body().occurrences_of(node)
            }
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({}: {})", self, self.ty())
    }
}

/// Handle to a parameter node
#[derive(Clone)]
pub struct Parameter(Expr);

impl Parameter {
    pub fn new(ty: TypeRef, name: Option<&str>) -> Self {
        let info = ParameterInfo {
            id: NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.map(str::to_string),
        };
        Parameter(Expr::new(ExprKind::Parameter(info), ty))
    }

    pub fn named(ty: TypeRef, name: &str) -> Self {
        Self::new(ty, Some(name))
    }

    pub fn unnamed(ty: TypeRef) -> Self {
        Self::new(ty, None)
    }

    fn info(&self) -> &ParameterInfo {
        match self.0.kind() {
            ExprKind::Parameter(info) => info,
            _ => unreachable!("parameter handle always wraps a parameter node"),
        }
    }

    pub fn id(&self) -> u64 {
        self.info().id
    }

    pub fn name(&self) -> Option<&str> {
        self.info().name.as_deref()
    }

    pub fn ty(&self) -> &TypeRef {
        self.0.ty()
    }

    pub fn as_expr(&self) -> &Expr {
        &self.0
    }

    pub fn to_expr(&self) -> Expr {
        self.0.clone()
    }

    pub fn ptr_eq(&self, other: &Parameter) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl TryFrom<Expr> for Parameter {
    type Error = ExprError;

    fn try_from(expr: Expr) -> ExprResult<Self> {
        expr.as_parameter().ok_or_else(|| {
            ExprError::invalid_shape(
                "lambda",
                format!("{} node {} cannot be used as a parameter", expr.kind().name(), expr),
            )
        })
    }
}

impl From<Parameter> for Expr {
    fn from(param: Parameter) -> Self {
        param.0
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter#{}({}: {})", self.id(), self.0, self.ty())
    }
}

/// A parameter list plus a body
#[derive(Clone)]
pub struct Lambda {
    params: Vec<Parameter>,
    body: Expr,
    ty: TypeRef,
}

impl Lambda {
    /// Create a lambda; each parameter may appear only once in the list
    pub fn new(params: Vec<Parameter>, body: Expr) -> ExprResult<Self> {
        for (index, param) in params.iter().enumerate() {
            if params[..index].iter().any(|earlier| earlier.ptr_eq(param)) {
                return Err(ExprError::invalid_shape(
                    "lambda",
                    format!("parameter {} is declared more than once", param.as_expr()),
                ));
            }
        }

        let ty = TypeRef::function(
            params.iter().map(|param| param.ty().clone()).collect(),
            body.ty().clone(),
        );
        Ok(Self { params, body, ty })
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn result_type(&self) -> &TypeRef {
        self.body.ty()
    }

    /// Function type of this lambda
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.params.iter().map(Parameter::ty)
    }

    /// Wrap this lambda as a node, e.g. to pass it as a call argument
    pub fn to_expr(&self) -> Expr {
        Expr::new(ExprKind::Lambda(self.clone()), self.ty.clone())
    }
}

impl From<Lambda> for Expr {
    fn from(lambda: Lambda) -> Self {
        let ty = lambda.ty.clone();
        Expr::new(ExprKind::Lambda(lambda), ty)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lambda({}: {})", self, self.ty)
    }
}
