//! Portfolio admin client
//!
//! Typed bindings for the portfolio server plus an optimistic, cached view of
//! each sibling list that drag-and-drop reorders are applied to.

pub mod commands;
pub mod models;
pub mod reorder;
pub mod store;

pub use commands::{ApiClient, ClientConfig, ClientError, SiblingCommands};
pub use reorder::reorder_cached;
pub use sibling_order::drag::{DragSession, DropOutcome};
pub use store::OptimisticList;
