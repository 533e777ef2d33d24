//! Graph algorithms over project references.
//!
//! Closures and direct references work on the declared graph alone.
//! Parent lookup and child ordering work on the closures recorded in a
//! [`CacheStore`](crate::cache::CacheStore).

pub mod closure;
pub mod order;

pub use closure::{compute_closure, compute_direct_references, get_parents};
pub use order::{ChildOrder, order_children, restore_order};
