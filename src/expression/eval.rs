//! Tree interpreter.
//!
//! Evaluates lambdas directly over [`Value`]s so composed trees can be checked
//! for behaviour, not just shape. Parameters are resolved by node identity,
//! which lets nested predicates read parameters of enclosing lambdas.

use crate::expression::{
    BinaryOperator, Expr, ExprError, ExprKind, ExprResult, Lambda, Parameter, Quantifier,
    UnaryOperator, Value,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Native implementation of a non-intrinsic method.
///
/// Instance methods receive their target as the first argument.
pub type NativeFunction = Arc<dyn Fn(&[Value]) -> ExprResult<Value> + Send + Sync>;

/// Parameter bindings of one lambda invocation
struct Frame<'a> {
    params: &'a [Parameter],
    args: &'a [Value],
    parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    fn lookup(&self, node: &Expr) -> Option<&'a Value> {
        self.params
            .iter()
            .position(|param| param.as_expr().ptr_eq(node))
            .map(|index| &self.args[index])
            .or_else(|| self.parent.and_then(|parent| parent.lookup(node)))
    }
}

/// Evaluator for lambdas
#[derive(Clone, Default)]
pub struct Evaluator {
    functions: HashMap<String, NativeFunction>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the implementation called for methods named `name`
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> ExprResult<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Invoke `lambda` with the given arguments
    pub fn invoke(&self, lambda: &Lambda, args: &[Value]) -> ExprResult<Value> {
        if args.len() != lambda.params().len() {
            return Err(ExprError::evaluation(format!(
                "{} expects {} arguments, got {}",
                lambda,
                lambda.params().len(),
                args.len()
            )));
        }

        let frame = Frame {
            params: lambda.params(),
            args,
            parent: None,
        };
        self.evaluate(lambda.body(), &frame)
    }

    /// Invoke a predicate and require a boolean result
    pub fn test(&self, predicate: &Lambda, args: &[Value]) -> ExprResult<bool> {
        let value = self.invoke(predicate, args)?;
        expect_bool(&value, "predicate result")
    }

    fn evaluate(&self, expr: &Expr, frame: &Frame<'_>) -> ExprResult<Value> {
        match expr.kind() {
            ExprKind::Constant(value) => Ok(value.clone()),

            ExprKind::Parameter(_) => frame
                .lookup(expr)
                .cloned()
                .ok_or_else(|| ExprError::evaluation(format!("Unbound parameter {}", expr))),

            ExprKind::Member { target, name } => match self.evaluate(target, frame)? {
                Value::Record(record) => record.get(name).cloned().ok_or_else(|| {
                    ExprError::evaluation(format!(
                        "{} has no member {}",
                        record.type_name, name
                    ))
                }),
                other => Err(ExprError::evaluation(format!(
                    "Cannot read member {} of {}",
                    name, other
                ))),
            },

            ExprKind::Call {
                target,
                method,
                args,
            } => {
                if let Some(quantifier) = method.intrinsic() {
                    return self.evaluate_quantifier(quantifier, args, frame);
                }

                let function = self.functions.get(method.name()).ok_or_else(|| {
                    ExprError::evaluation(format!("Unknown function: {}", method.name()))
                })?;

                let mut values = Vec::with_capacity(args.len() + 1);
                if let Some(target) = target {
                    values.push(self.evaluate(target, frame)?);
                }
                for arg in args {
                    values.push(self.evaluate(arg, frame)?);
                }
                function(&values)
            }

            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand, frame)?;
                evaluate_unary_op(*op, value)
            }

            ExprKind::Binary { op, left, right } => match op {
                // Short-circuit: the right operand is only evaluated when needed
                BinaryOperator::AndAlso => {
                    if !expect_bool(&self.evaluate(left, frame)?, "&& operand")? {
                        return Ok(Value::Boolean(false));
                    }
                    let right = self.evaluate(right, frame)?;
                    Ok(Value::Boolean(expect_bool(&right, "&& operand")?))
                }
                BinaryOperator::OrElse => {
                    if expect_bool(&self.evaluate(left, frame)?, "|| operand")? {
                        return Ok(Value::Boolean(true));
                    }
                    let right = self.evaluate(right, frame)?;
                    Ok(Value::Boolean(expect_bool(&right, "|| operand")?))
                }
                _ => {
                    let left = self.evaluate(left, frame)?;
                    let right = self.evaluate(right, frame)?;
                    evaluate_binary_op(*op, left, right)
                }
            },

            ExprKind::Lambda(_) => Err(ExprError::evaluation(
                "Lambda values can only be passed to sequence operators",
            )),
        }
    }

    fn evaluate_quantifier(
        &self,
        quantifier: Quantifier,
        args: &[Expr],
        frame: &Frame<'_>,
    ) -> ExprResult<Value> {
        let [source, operand] = args else {
            return Err(ExprError::evaluation(format!(
                "{} expects 2 arguments, got {}",
                quantifier,
                args.len()
            )));
        };

        let elements = match self.evaluate(source, frame)? {
            Value::List(elements) => elements,
            other => {
                return Err(ExprError::evaluation(format!(
                    "{} source must be a list, got {}",
                    quantifier, other
                )))
            }
        };

        if quantifier == Quantifier::Contains {
            let needle = self.evaluate(operand, frame)?;
            return Ok(Value::Boolean(elements.contains(&needle)));
        }

        let predicate = match operand.kind() {
            ExprKind::Lambda(lambda) => lambda,
            _ => {
                return Err(ExprError::evaluation(format!(
                    "{} expects a lambda predicate, got {}",
                    quantifier, operand
                )))
            }
        };

        for element in &elements {
            let inner = Frame {
                params: predicate.params(),
                args: std::slice::from_ref(element),
                parent: Some(frame),
            };
            let matched = expect_bool(&self.evaluate(predicate.body(), &inner)?, "predicate result")?;
            match quantifier {
                Quantifier::Any if matched => return Ok(Value::Boolean(true)),
                Quantifier::All if !matched => return Ok(Value::Boolean(false)),
                _ => {}
            }
        }

        Ok(Value::Boolean(quantifier == Quantifier::All))
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("Evaluator").field("functions", &names).finish()
    }
}

fn expect_bool(value: &Value, context: &str) -> ExprResult<bool> {
    value.as_bool().ok_or_else(|| {
        ExprError::evaluation(format!("Expected Boolean for {}, got {}", context, value))
    })
}

fn evaluate_unary_op(op: UnaryOperator, operand: Value) -> ExprResult<Value> {
    match (op, operand) {
        (UnaryOperator::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOperator::Negate, Value::Int32(n)) => Ok(Value::Int32(n.wrapping_neg())),
        (op, operand) => Err(ExprError::evaluation(format!(
            "Invalid operand for {}: {}",
            op, operand
        ))),
    }
}

fn evaluate_binary_op(op: BinaryOperator, left: Value, right: Value) -> ExprResult<Value> {
    match op {
        BinaryOperator::Eq => Ok(Value::Boolean(left == right)),
        BinaryOperator::Ne => Ok(Value::Boolean(left != right)),
        BinaryOperator::Lt => compare_values(op, &left, &right, Ordering::is_lt),
        BinaryOperator::Le => compare_values(op, &left, &right, Ordering::is_le),
        BinaryOperator::Gt => compare_values(op, &left, &right, Ordering::is_gt),
        BinaryOperator::Ge => compare_values(op, &left, &right, Ordering::is_ge),

        BinaryOperator::Add
        | BinaryOperator::Sub
        | BinaryOperator::Mul
        | BinaryOperator::Div => match (&left, &right) {
            (Value::Int32(a), Value::Int32(b)) => match op {
                BinaryOperator::Add => Ok(Value::Int32(a.wrapping_add(*b))),
                BinaryOperator::Sub => Ok(Value::Int32(a.wrapping_sub(*b))),
                BinaryOperator::Mul => Ok(Value::Int32(a.wrapping_mul(*b))),
                _ if *b == 0 => Err(ExprError::evaluation("Division by zero")),
                _ => Ok(Value::Int32(a.wrapping_div(*b))),
            },
            _ => Err(invalid_operands(op, &left, &right)),
        },

        // Handled with short-circuiting before operands are evaluated
        BinaryOperator::AndAlso => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
            _ => Err(invalid_operands(op, &left, &right)),
        },
        BinaryOperator::OrElse => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a || *b)),
            _ => Err(invalid_operands(op, &left, &right)),
        },
    }
}

fn compare_values<F>(op: BinaryOperator, left: &Value, right: &Value, cmp_fn: F) -> ExprResult<Value>
where
    F: FnOnce(Ordering) -> bool,
{
    let ordering = match (left, right) {
        (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => return Err(invalid_operands(op, left, right)),
    };
    Ok(Value::Boolean(cmp_fn(ordering)))
}

fn invalid_operands(op: BinaryOperator, left: &Value, right: &Value) -> ExprError {
    ExprError::evaluation(format!(
        "Invalid operands for {}: {} and {}",
        op, left, right
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Method, Record, TypeRef};

    fn order_type() -> TypeRef {
        TypeRef::entity("Order")
    }

    fn sample_order() -> Value {
        Record::new("Order")
            .with("Total", 120)
            .with("Paid", false)
            .with(
                "Items",
                vec![
                    Value::from(Record::new("Item").with("Price", 20)),
                    Value::from(Record::new("Item").with("Price", 100)),
                ],
            )
            .into()
    }

    #[test]
    fn test_member_and_comparison() {
        let x = Parameter::named(order_type(), "x");
        let lambda = Lambda::new(
            vec![x.clone()],
            Expr::gt(
                Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap(),
                Expr::int32(100),
            )
            .unwrap(),
        )
        .unwrap();

        let evaluator = Evaluator::new();
        assert!(evaluator.test(&lambda, &[sample_order()]).unwrap());
    }

    #[test]
    fn test_short_circuit() {
        let x = Parameter::named(order_type(), "x");
        // The right operand reads a missing member and would fail if evaluated
        let body = Expr::or_else(
            Expr::boolean(true),
            Expr::member(x.to_expr(), "Missing", TypeRef::Boolean).unwrap(),
        )
        .unwrap();
        let lambda = Lambda::new(vec![x.clone()], body).unwrap();
        assert!(Evaluator::new().test(&lambda, &[sample_order()]).unwrap());

        let body = Expr::and_also(
            Expr::boolean(false),
            Expr::member(x.to_expr(), "Missing", TypeRef::Boolean).unwrap(),
        )
        .unwrap();
        let lambda = Lambda::new(vec![x], body).unwrap();
        assert!(!Evaluator::new().test(&lambda, &[sample_order()]).unwrap());
    }

    #[test]
    fn test_nested_predicate_reads_outer_parameter() {
        let item = TypeRef::entity("Item");
        let x = Parameter::named(order_type(), "x");
        let i = Parameter::named(item.clone(), "i");

        let predicate = Lambda::new(
            vec![i.clone()],
            Expr::gt(
                Expr::add_expr(
                    Expr::member(i.to_expr(), "Price", TypeRef::Int32).unwrap(),
                    Expr::int32(1),
                )
                .unwrap(),
                Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap(),
            )
            .unwrap(),
        )
        .unwrap();
        let call = Expr::call(
            None,
            Method::sequence(Quantifier::Any, &item),
            vec![
                Expr::member(x.to_expr(), "Items", TypeRef::sequence(item)).unwrap(),
                predicate.to_expr(),
            ],
        )
        .unwrap();
        let lambda = Lambda::new(vec![x], call).unwrap();

        // 101 > 120 is false for every item
        assert!(!Evaluator::new().test(&lambda, &[sample_order()]).unwrap());
    }

    #[test]
    fn test_native_functions() {
        let x = Parameter::named(order_type(), "x");
        let method = Method::instance("IsLarge", vec![TypeRef::Int32], TypeRef::Boolean);
        let lambda = Lambda::new(
            vec![x.clone()],
            Expr::call(Some(x.to_expr()), method, vec![Expr::int32(50)]).unwrap(),
        )
        .unwrap();

        let mut evaluator = Evaluator::new();
        assert!(matches!(
            evaluator.test(&lambda, &[sample_order()]),
            Err(ExprError::Evaluation(_))
        ));

        evaluator.register("IsLarge", |args| match args {
            [Value::Record(order), Value::Int32(limit)] => match order.get("Total") {
                Some(Value::Int32(total)) => Ok(Value::Boolean(total > limit)),
                _ => Err(ExprError::evaluation("Order without Total")),
            },
            _ => Err(ExprError::evaluation("IsLarge: bad arguments")),
        });
        assert!(evaluator.test(&lambda, &[sample_order()]).unwrap());
    }

    #[test]
    fn test_evaluation_errors() {
        let n = Parameter::named(TypeRef::Int32, "n");
        let lambda = Lambda::new(
            vec![n.clone()],
            Expr::binary(BinaryOperator::Div, Expr::int32(10), n.to_expr()).unwrap(),
        )
        .unwrap();

        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.invoke(&lambda, &[Value::Int32(2)]).unwrap(),
            Value::Int32(5)
        );
        assert_eq!(
            evaluator.invoke(&lambda, &[Value::Int32(0)]),
            Err(ExprError::Evaluation("Division by zero".to_string()))
        );
        assert!(evaluator.invoke(&lambda, &[]).is_err());
    }
}
