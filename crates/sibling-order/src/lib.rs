//! Sibling Ordering
//!
//! Keeps a dense, unique, 1-based `order` across entities that share a parent,
//! and rearranges them without ever holding two siblings on the same value:
//! - moves: array move and next-order helpers
//! - plan: two-phase reorder plans and the wire request type
//! - store: the persistence port a plan is written through
//! - protocol: sequential write-back and per-parent serialization
//! - drag: pointer gesture model producing (from, to) moves

mod error;
mod moves;
mod plan;
mod protocol;
mod store;

pub mod drag;

#[cfg(test)]
mod testing;

pub use error::{PlanError, ReorderError, StoreError};
pub use moves::{array_move, next_order, Sequenced};
pub use plan::{OrderChange, OrderMove, Phase, ReorderPlan, ReorderRequest, ORDER_LIMIT, TEMP_ORDER_BASE};
pub use protocol::{write_back, ReorderOutcome, Reorderer};
pub use store::SiblingStore;
