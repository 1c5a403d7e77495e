//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod project_repo;
mod sibling;


pub use traits::Repository;
pub use db::{init_db, DbState};
pub use project_repo::ProjectRepository;
pub use sibling::{SiblingHierarchyOperations, SiblingPositioningOperations, SiblingRepository};
