//! exprweave - composes sample expression trees and evaluates the results

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use exprweave::combinator::{self, LogicalOperation};
use exprweave::expression::{Evaluator, Expr, ExprResult, Lambda, Parameter, Record, TypeRef, Value};
use log::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Demo {
    Or,
    And,
    Any,
    All,
    Contains,
    Tail,
    /// Fold a list of optional filters with AND
    Fold,
    /// Run every demo
    Every,
}

/// Compose expression trees over a sample order model
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Composition to demonstrate
    #[arg(short = 'm', long, value_enum, default_value = "every")]
    demo: Demo,

    /// Literal used by the sample predicates
    #[arg(short, long, default_value = "5")]
    threshold: i32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn order_type() -> TypeRef {
    TypeRef::entity("Order")
}

fn item_type() -> TypeRef {
    TypeRef::entity("Item")
}

fn customer_type() -> TypeRef {
    TypeRef::entity("Customer")
}

fn sample_order() -> Value {
    Record::new("Order")
        .with("Paid", true)
        .with("Shipped", false)
        .with("Customer", Record::new("Customer").with("Age", 34))
        .with(
            "Items",
            vec![
                Value::from(Record::new("Item").with("Price", 5)),
                Value::from(Record::new("Item").with("Price", 12)),
            ],
        )
        .with("Codes", vec![1, 5, 8])
        .into()
}

/// `x => x.<name>` over an order, with a parameter of its own
fn order_member(name: &str, ty: TypeRef) -> ExprResult<Lambda> {
    let x = Parameter::named(order_type(), "x");
    let body = Expr::member(x.to_expr(), name, ty)?;
    Lambda::new(vec![x], body)
}

fn price_equals(threshold: i32) -> ExprResult<Lambda> {
    let i = Parameter::named(item_type(), "i");
    let body = Expr::eq(
        Expr::member(i.to_expr(), "Price", TypeRef::Int32)?,
        Expr::int32(threshold),
    )?;
    Lambda::new(vec![i], body)
}

fn report(evaluator: &Evaluator, title: &str, lambda: &Lambda) -> Result<()> {
    let result = evaluator
        .invoke(lambda, &[sample_order()])
        .with_context(|| format!("Failed to evaluate {}", lambda))?;
    println!("{:<9} {}", title, lambda);
    println!("{:<9} = {}", "", result);
    Ok(())
}

fn run_join(evaluator: &Evaluator, op: LogicalOperation) -> Result<()> {
    let paid = order_member("Paid", TypeRef::Boolean)?;
    let shipped = order_member("Shipped", TypeRef::Boolean)?;
    let joined = combinator::join(Some(&paid), Some(&shipped), op)
        .context("Failed to join predicates")?
        .context("Join of two predicates produced nothing")?;
    report(evaluator, &op.to_string(), &joined)
}

fn run_quantifier(evaluator: &Evaluator, demo: Demo, threshold: i32) -> Result<()> {
    let items = order_member("Items", TypeRef::sequence(item_type()))?;
    let predicate = price_equals(threshold)?;
    let lifted = match demo {
        Demo::Any => items.any(&predicate),
        _ => items.all(&predicate),
    }
    .context("Failed to lift predicate over Items")?;
    report(evaluator, if demo == Demo::Any { "ANY" } else { "ALL" }, &lifted)
}

fn run_contains(evaluator: &Evaluator, threshold: i32) -> Result<()> {
    let codes = order_member("Codes", TypeRef::sequence(TypeRef::Int32))?;
    let lifted = codes
        .contains(threshold)
        .context("Failed to build Contains predicate")?;
    report(evaluator, "CONTAINS", &lifted)
}

fn run_tail(evaluator: &Evaluator, threshold: i32) -> Result<()> {
    let customer = order_member("Customer", customer_type())?;
    let c = Parameter::named(customer_type(), "c");
    let older = Lambda::new(
        vec![c.clone()],
        Expr::gt(
            Expr::member(c.to_expr(), "Age", TypeRef::Int32)?,
            Expr::int32(threshold),
        )?,
    )?;
    let spliced = customer
        .add_tail(&older)
        .context("Failed to splice continuation")?;
    report(evaluator, "TAIL", &spliced)
}

fn run_fold(evaluator: &Evaluator, threshold: i32) -> Result<()> {
    // Unset filters are skipped rather than treated as true or false
    let filters = vec![
        Some(order_member("Paid", TypeRef::Boolean)?),
        None,
        Some(
            order_member("Items", TypeRef::sequence(item_type()))?.any(&price_equals(threshold)?)?,
        ),
    ];

    let mut combined: Option<Lambda> = None;
    for filter in &filters {
        combined = combinator::and(combined.as_ref(), filter.as_ref())
            .context("Failed to fold filters")?;
        debug!("accumulated filter: {:?}", combined);
    }

    match combined {
        Some(filter) => report(evaluator, "FOLD", &filter),
        None => {
            info!("No filters set");
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!(
        "Running {:?} demo with threshold {}",
        args.demo, args.threshold
    );

    let evaluator = Evaluator::new();
    let every = args.demo == Demo::Every;

    if every || args.demo == Demo::Or {
        run_join(&evaluator, LogicalOperation::Or)?;
    }
    if every || args.demo == Demo::And {
        run_join(&evaluator, LogicalOperation::And)?;
    }
    if every || args.demo == Demo::Any {
        run_quantifier(&evaluator, Demo::Any, args.threshold)?;
    }
    if every || args.demo == Demo::All {
        run_quantifier(&evaluator, Demo::All, args.threshold)?;
    }
    if every || args.demo == Demo::Contains {
        run_contains(&evaluator, args.threshold)?;
    }
    if every || args.demo == Demo::Tail {
        run_tail(&evaluator, args.threshold)?;
    }
    if every || args.demo == Demo::Fold {
        run_fold(&evaluator, args.threshold)?;
    }

    Ok(())
}
