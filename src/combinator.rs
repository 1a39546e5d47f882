//! Combinators that build larger lambdas out of smaller ones.
//!
//! Every combinator leaves its inputs untouched and returns a newly
//! assembled lambda:
//! - `join`, `and`, `or`: `&&` / `||` of predicates with unified parameters
//! - `any`, `all`, `contains`: predicates over a collection member
//! - `add_tail`: selector followed by a continuation

pub mod join;
pub mod quantifier;
pub mod tail;

pub use join::{and, join, join_with_operator, or, LogicalOperation};
pub use quantifier::{all, any, contains};
pub use tail::add_tail;
