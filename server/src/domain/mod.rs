//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no storage or transport dependencies.

mod entity;
mod project;
mod sibling;

pub use entity::{DomainError, DomainResult, Entity};
pub use project::Project;
pub use sibling::{OrderedEntity, SiblingKind};
