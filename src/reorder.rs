//! Optimistic reorder against a cached sibling list

use sibling_order::{ReorderError, ReorderOutcome, Reorderer, SiblingStore};

use crate::store::OptimisticList;

/// Move `from` to `to` in `cache` right away, then persist the move.
///
/// On success the cache is committed. On failure the cache is replaced by a
/// fresh server list, or rolled back if that refetch fails too, and the
/// original error is returned.
pub async fn reorder_cached<S>(
    reorderer: &Reorderer<S>,
    cache: &mut OptimisticList<S::Item>,
    from: usize,
    to: usize,
) -> Result<ReorderOutcome<S::Item>, ReorderError>
where
    S: SiblingStore,
{
    let parent_id = cache.parent_id();
    let before = cache.items().to_vec();
    cache.apply_move(from, to)?;

    match reorderer.reorder(parent_id, &before, from, to).await {
        Ok(outcome) => {
            cache.commit();
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!(parent_id, from, to, error = %e, "reorder failed, refreshing siblings");
            match reorderer.store().list_siblings(parent_id).await {
                Ok(fresh) => cache.reconcile(fresh),
                Err(refetch) => {
                    tracing::warn!(parent_id, error = %refetch, "refresh failed, rolling back");
                    cache.rollback();
                }
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderedEntity, SiblingKind};
    use async_trait::async_trait;
    use sibling_order::{Phase, StoreError};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory quests of one zone that can fail a chosen write once, or the listing.
    #[derive(Default)]
    struct FlakyStore {
        rows: Mutex<HashMap<u32, i32>>,
        writes: Mutex<usize>,
        fail_write: Mutex<Option<usize>>,
        fail_list: bool,
    }

    impl FlakyStore {
        fn with_orders(orders: &[(u32, i32)]) -> Self {
            Self {
                rows: Mutex::new(orders.iter().copied().collect()),
                ..Default::default()
            }
        }

        fn snapshot(&self) -> Vec<OrderedEntity> {
            let rows = self.rows.lock().unwrap();
            let mut list: Vec<OrderedEntity> = rows.iter().map(|(&id, &order)| quest(id, order)).collect();
            list.sort_by_key(|q| q.order);
            list
        }
    }

    #[async_trait]
    impl SiblingStore for FlakyStore {
        type Item = OrderedEntity;

        async fn list_siblings(&self, _parent_id: u32) -> Result<Vec<OrderedEntity>, StoreError> {
            if self.fail_list {
                return Err(StoreError::Transport("offline".into()));
            }
            Ok(self.snapshot())
        }

        async fn update_order(&self, id: u32, order: i32) -> Result<(), StoreError> {
            let mut writes = self.writes.lock().unwrap();
            let mut fail_write = self.fail_write.lock().unwrap();
            if *fail_write == Some(*writes) {
                *fail_write = None;
                return Err(StoreError::Transport("connection reset".into()));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|(&other, &o)| other != id && o == order) {
                return Err(StoreError::Conflict(format!("order {} taken", order)));
            }
            rows.insert(id, order);
            *writes += 1;
            Ok(())
        }
    }

    fn quest(id: u32, order: i32) -> OrderedEntity {
        OrderedEntity {
            id,
            kind: SiblingKind::Quest,
            parent_id: 7,
            title: format!("Q{}", id),
            description: None,
            order,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(items: &[OrderedEntity]) -> Vec<u32> {
        items.iter().map(|q| q.id).collect()
    }

    #[tokio::test]
    async fn test_success_commits_cache() {
        let store = Arc::new(FlakyStore::with_orders(&[(1, 1), (2, 2), (3, 3)]));
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());

        let outcome = reorder_cached(&reorderer, &mut cache, 0, 2).await.unwrap();
        assert_eq!(outcome.writes, 6);
        assert_eq!(ids(cache.items()), vec![2, 3, 1]);
        assert!(!cache.is_dirty());
        assert_eq!(cache.items(), outcome.siblings.as_slice());
        assert_eq!(cache.items(), store.snapshot().as_slice());
    }

    #[tokio::test]
    async fn test_failed_commit_reconciles_with_server() {
        let store = Arc::new(FlakyStore {
            fail_write: Mutex::new(Some(3)),
            ..FlakyStore::with_orders(&[(1, 1), (2, 2), (3, 3)])
        });
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());

        let err = reorder_cached(&reorderer, &mut cache, 0, 2).await.unwrap_err();
        assert!(matches!(err, ReorderError::Write { phase: Phase::Commit, completed: 3, .. }));

        // Stage pass landed, commit pass did not
        assert_eq!(ids(cache.items()), vec![2, 3, 1]);
        let orders: Vec<i32> = cache.items().iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![10000, 10001, 10002]);
        assert!(!cache.is_dirty());
    }

    #[tokio::test]
    async fn test_next_reorder_after_failed_commit_restores_dense_orders() {
        let store = Arc::new(FlakyStore {
            fail_write: Mutex::new(Some(3)),
            ..FlakyStore::with_orders(&[(1, 1), (2, 2), (3, 3)])
        });
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());
        reorder_cached(&reorderer, &mut cache, 0, 2).await.unwrap_err();

        // Q1 is dragged back to the front of the refreshed list
        let outcome = reorder_cached(&reorderer, &mut cache, 2, 0).await.unwrap();

        assert_eq!(outcome.writes, 6);
        assert_eq!(ids(cache.items()), vec![1, 2, 3]);
        let orders: Vec<i32> = cache.items().iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert!(!cache.is_dirty());
        assert_eq!(cache.items(), store.snapshot().as_slice());
    }

    #[tokio::test]
    async fn test_failed_refresh_rolls_back() {
        let store = Arc::new(FlakyStore {
            fail_write: Mutex::new(Some(0)),
            fail_list: true,
            ..FlakyStore::with_orders(&[(1, 1), (2, 2)])
        });
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());

        assert!(reorder_cached(&reorderer, &mut cache, 1, 0).await.is_err());
        assert_eq!(ids(cache.items()), vec![1, 2]);
        assert!(!cache.is_dirty());
    }

    #[tokio::test]
    async fn test_same_slot_writes_nothing() {
        let store = Arc::new(FlakyStore::with_orders(&[(1, 1), (2, 2)]));
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());

        let outcome = reorder_cached(&reorderer, &mut cache, 1, 1).await.unwrap();
        assert_eq!(outcome.writes, 0);
        assert_eq!(*store.writes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_is_plan_error() {
        let store = Arc::new(FlakyStore::with_orders(&[(1, 1), (2, 2)]));
        let reorderer = Reorderer::new(store.clone());
        let mut cache = OptimisticList::new(7, store.snapshot());

        let err = reorder_cached(&reorderer, &mut cache, 0, 9).await.unwrap_err();
        assert!(matches!(err, ReorderError::Plan(_)));
        assert!(!cache.is_dirty());
    }
}
