//! Sibling Repository Module
//!
//! Zones, floors and quests share one implementation parameterized by
//! [`SiblingKind`](crate::domain::SiblingKind).

mod sibling_hierarchy;
mod sibling_positioning;
mod sibling_repo;
mod sibling_store;

pub use sibling_hierarchy::SiblingHierarchyOperations;
pub use sibling_positioning::SiblingPositioningOperations;
pub use sibling_repo::SiblingRepository;
