//! Repository Layer - Core Traits
//!
//! Storage-agnostic CRUD over domain entities. Ordering-specific operations
//! live on the sibling repository traits.

use async_trait::async_trait;
use crate::domain::{DomainError, DomainResult, Entity};

/// CRUD for one entity type. Writes validate the entity first.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert and return the stored entity with its assigned ID
    async fn create(&self, entity: &T) -> DomainResult<T>;

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Fails with `NotFound` when no row has the entity's ID
    async fn update(&self, entity: &T) -> DomainResult<T>;

    async fn delete(&self, id: T::Id) -> DomainResult<()>;

    /// Like `find_by_id`, but a missing entity is an error
    async fn require(&self, id: T::Id, label: &str) -> DomainResult<T> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("{} {} not found", label, id)))
    }
}
