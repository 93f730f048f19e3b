//! Graph algorithms over the [`crate::utils::graph`] traits.

mod traversal;

pub use traversal::postorder;
