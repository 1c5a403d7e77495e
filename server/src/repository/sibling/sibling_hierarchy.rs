//! Sibling Repository - Hierarchy Operations

use async_trait::async_trait;

use super::sibling_repo::{ensure_parent, parent_exists_in, query_siblings, SiblingRepository};
use crate::domain::{DomainResult, OrderedEntity};

/// Parent/child lookups for ordered siblings
#[async_trait]
pub trait SiblingHierarchyOperations: Send + Sync {
    /// Children of `parent_id`, sorted by order. Fails with `NotFound` for an unknown parent.
    async fn children_of(&self, parent_id: u32) -> DomainResult<Vec<OrderedEntity>>;

    async fn parent_exists(&self, parent_id: u32) -> DomainResult<bool>;
}

#[async_trait]
impl SiblingHierarchyOperations for SiblingRepository {
    async fn children_of(&self, parent_id: u32) -> DomainResult<Vec<OrderedEntity>> {
        let conn = self.conn.lock().await;
        ensure_parent(&conn, self.kind, parent_id)?;
        query_siblings(&conn, self.kind, parent_id)
    }

    async fn parent_exists(&self, parent_id: u32) -> DomainResult<bool> {
        let conn = self.conn.lock().await;
        parent_exists_in(&conn, self.kind, parent_id)
    }
}
