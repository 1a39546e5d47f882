//! Printed form of expression trees.
//!
//! The printed form is what tests compare: two trees built independently are
//! equivalent when they print the same.

use crate::expression::{
    BinaryOperator, CallStyle, Expr, ExprKind, Lambda, Parameter, ParameterInfo, Quantifier,
    TypeRef, UnaryOperator, Value,
};
use std::fmt;

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Boolean => write!(f, "Boolean"),
            TypeRef::Int32 => write!(f, "Int32"),
            TypeRef::String => write!(f, "String"),
            TypeRef::Object => write!(f, "Object"),
            TypeRef::Entity(name) => write!(f, "{}", name),
            TypeRef::Sequence(element) => write!(f, "Sequence<{}>", element),
            TypeRef::Function { params, result } => {
                write!(f, "Func<")?;
                for param in params {
                    write!(f, "{}, ", param)?;
                }
                write!(f, "{}>", result)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int32(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Record(record) => {
                write!(f, "{} {{", record.type_name)?;
                for (index, (name, value)) in record.fields.iter().enumerate() {
                    let sep = if index == 0 { " " } else { ", " };
                    write!(f, "{}{} = {}", sep, name, value)?;
                }
                write!(f, " }}")
            }
            Value::List(values) => {
                write!(f, "[")?;
                write_separated(f, values)?;
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_parameter(f: &mut fmt::Formatter<'_>, info: &ParameterInfo) -> fmt::Result {
    match &info.name {
        Some(name) => write!(f, "{}", name),
        None => write!(f, "Param_{}", info.id),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Constant(value) => write!(f, "{}", value),
            ExprKind::Parameter(info) => write_parameter(f, info),
            ExprKind::Member { target, name } => write!(f, "{}.{}", target, name),
            ExprKind::Call {
                target,
                method,
                args,
            } => match (method.style(), target) {
                (CallStyle::Instance, Some(target)) => {
                    write!(f, "{}.{}(", target, method.name())?;
                    write_separated(f, args)?;
                    write!(f, ")")
                }
                (CallStyle::Extension, None) if !args.is_empty() => {
                    write!(f, "{}.{}(", args[0], method.name())?;
                    write_separated(f, &args[1..])?;
                    write!(f, ")")
                }
                _ => {
                    write!(f, "{}(", method.name())?;
                    write_separated(f, args)?;
                    write!(f, ")")
                }
            },
            ExprKind::Unary { op, operand } => {
                // `-(-5)` and `!(!x)` rather than `--5` and `!!x`
                let nested = matches!(
                    operand.kind(),
                    ExprKind::Unary { .. } | ExprKind::Constant(Value::Int32(i32::MIN..=-1))
                );
                if nested {
                    write!(f, "{}({})", op, operand)
                } else {
                    write!(f, "{}{}", op, operand)
                }
            }
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ExprKind::Lambda(lambda) => write!(f, "{}", lambda),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_expr())
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params() {
            [single] => write!(f, "{}", single)?,
            params => {
                write!(f, "(")?;
                write_separated(f, params)?;
                write!(f, ")")?;
            }
        }
        write!(f, " => {}", self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Method, Record};

    #[test]
    fn test_type_display() {
        assert_eq!(TypeRef::Int32.to_string(), "Int32");
        assert_eq!(
            TypeRef::sequence(TypeRef::entity("Item")).to_string(),
            "Sequence<Item>"
        );
        assert_eq!(
            TypeRef::function(vec![TypeRef::entity("Order")], TypeRef::Boolean).to_string(),
            "Func<Order, Boolean>"
        );
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(
            Value::from(Record::new("Item").with("Price", 3).with("Code", "a")).to_string(),
            "Item { Code = \"a\", Price = 3 }"
        );
    }

    #[test]
    fn test_expression_display() {
        let x = Parameter::named(TypeRef::entity("Order"), "x");
        let paid = Expr::member(x.to_expr(), "Paid", TypeRef::Boolean).unwrap();
        let total = Expr::member(x.to_expr(), "Total", TypeRef::Int32).unwrap();

        let body = Expr::or_else(
            Expr::not_expr(paid).unwrap(),
            Expr::gt(total, Expr::int32(100)).unwrap(),
        )
        .unwrap();
        let lambda = Lambda::new(vec![x.clone()], body).unwrap();
        assert_eq!(lambda.to_string(), "x => (!x.Paid || (x.Total > 100))");

        let late = Method::instance("IsLate", vec![], TypeRef::Boolean);
        let call = Expr::call(Some(x.to_expr()), late, vec![]).unwrap();
        assert_eq!(call.to_string(), "x.IsLate()");

        let check = Method::static_fn("Check", vec![TypeRef::Object], TypeRef::Boolean);
        let call = Expr::call(None, check, vec![x.to_expr()]).unwrap();
        assert_eq!(call.to_string(), "Check(x)");
    }

    #[test]
    fn test_nested_unary_display() {
        let negative = Expr::unary(UnaryOperator::Negate, Expr::int32(-5)).unwrap();
        assert_eq!(negative.to_string(), "-(-5)");

        let n = Parameter::named(TypeRef::Int32, "n");
        let twice = Expr::unary(
            UnaryOperator::Negate,
            Expr::unary(UnaryOperator::Negate, n.to_expr()).unwrap(),
        )
        .unwrap();
        assert_eq!(twice.to_string(), "-(-n)");

        let flag = Parameter::named(TypeRef::Boolean, "flag");
        let not_not = Expr::not_expr(Expr::not_expr(flag.to_expr()).unwrap()).unwrap();
        assert_eq!(not_not.to_string(), "!(!flag)");

        assert_eq!(
            Expr::unary(UnaryOperator::Negate, Expr::int32(5)).unwrap().to_string(),
            "-5"
        );
    }

    #[test]
    fn test_lambda_parameter_lists() {
        let order = TypeRef::entity("Order");
        let k = Parameter::named(order.clone(), "k");
        let l = Parameter::named(order, "l");
        let body = Expr::eq(k.to_expr(), l.to_expr()).unwrap();
        let lambda = Lambda::new(vec![k, l], body).unwrap();
        assert_eq!(lambda.to_string(), "(k, l) => (k == l)");

        let constant = Lambda::new(vec![], Expr::boolean(true)).unwrap();
        assert_eq!(constant.to_string(), "() => true");

        let anonymous = Parameter::unnamed(TypeRef::Int32);
        assert_eq!(anonymous.to_string(), format!("Param_{}", anonymous.id()));
    }
}
