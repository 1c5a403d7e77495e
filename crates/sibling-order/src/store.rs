use async_trait::async_trait;

use crate::error::StoreError;
use crate::moves::Sequenced;

/// Persistence port a reorder is written through.
///
/// Implementations must reject any write that would give two siblings of the
/// same parent the same order with [`StoreError::Conflict`].
#[async_trait]
pub trait SiblingStore: Send + Sync {
    type Item: Sequenced + Clone + Send + Sync;

    /// Children of `parent_id`, sorted by order.
    async fn list_siblings(&self, parent_id: u32) -> Result<Vec<Self::Item>, StoreError>;

    /// Set the order of a single entity.
    async fn update_order(&self, id: u32, order: i32) -> Result<(), StoreError>;
}
