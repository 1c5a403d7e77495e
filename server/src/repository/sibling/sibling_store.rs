//! Sibling Repository - Reorder Store Port
//!
//! Lets the generic two-phase write-back drive the database one write at a
//! time, the same way a remote client drives the HTTP API.

use async_trait::async_trait;
use sibling_order::{SiblingStore, StoreError};

use super::sibling_hierarchy::SiblingHierarchyOperations;
use super::sibling_positioning::SiblingPositioningOperations;
use super::sibling_repo::SiblingRepository;
use crate::domain::{DomainError, OrderedEntity};

#[async_trait]
impl SiblingStore for SiblingRepository {
    type Item = OrderedEntity;

    async fn list_siblings(&self, parent_id: u32) -> Result<Vec<OrderedEntity>, StoreError> {
        self.children_of(parent_id).await.map_err(to_store_error)
    }

    async fn update_order(&self, id: u32, order: i32) -> Result<(), StoreError> {
        self.set_order(id, order).await.map_err(to_store_error)
    }
}

fn to_store_error(e: DomainError) -> StoreError {
    match e {
        DomainError::NotFound(msg) => StoreError::NotFound(msg),
        DomainError::Conflict(msg) => StoreError::Conflict(msg),
        DomainError::InvalidInput(msg) => StoreError::Invalid(msg),
        DomainError::Internal(msg) => StoreError::Transport(msg),
    }
}
