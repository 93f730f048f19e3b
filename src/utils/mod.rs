//! Supporting utilities: natural ordering, DOT escaping and the generic graph arena.

mod dot;
mod natural;

pub mod graph;

pub use dot::escape_dot;
pub use natural::{natural_cmp, natural_sort};
