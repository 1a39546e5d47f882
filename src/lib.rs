pub mod combinator;
pub mod expression;
