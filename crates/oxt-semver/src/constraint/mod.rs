//! Constraint types for version matching

mod bound;
mod constraint;
mod operator;
mod rule;

pub use bound::Bound;
pub use constraint::Constraint;
pub use operator::{InvalidOperatorError, Operator};
pub use rule::Rule;
