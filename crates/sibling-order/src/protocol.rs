//! Two-phase write-back
//!
//! Writes are issued one at a time and awaited before the next; the stage
//! pass completes before the first commit write. Any failure stops the
//! operation where it is.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::ReorderError;
use crate::plan::{Phase, ReorderPlan};
use crate::store::SiblingStore;

/// Write `plan` through `store`. Returns the number of writes issued.
pub async fn write_back<S>(store: &S, plan: &ReorderPlan) -> Result<usize, ReorderError>
where
    S: SiblingStore + ?Sized,
{
    let mut completed = 0;
    for phase in [Phase::Stage, Phase::Commit] {
        for (id, order) in plan.writes(phase) {
            tracing::debug!(%phase, id, order, "writing sibling order");
            store
                .update_order(id, order)
                .await
                .map_err(|source| ReorderError::Write {
                    phase,
                    id,
                    completed,
                    source,
                })?;
            completed += 1;
        }
    }
    Ok(completed)
}

/// Result of a completed reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOutcome<T> {
    /// Siblings in their new order, carrying their final order values.
    pub siblings: Vec<T>,
    pub writes: usize,
}

/// Runs reorders against one store, one at a time per parent.
///
/// Reorders of different parents do not wait on each other.
pub struct Reorderer<S: SiblingStore> {
    store: Arc<S>,
    parents: Mutex<HashMap<u32, Arc<Mutex<()>>>>,
}

impl<S: SiblingStore> Reorderer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            parents: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    async fn parent_lock(&self, parent_id: u32) -> Arc<Mutex<()>> {
        let mut parents = self.parents.lock().await;
        parents.entry(parent_id).or_default().clone()
    }

    /// Forget the lock of `parent_id` once no other reorder holds or awaits it.
    async fn release(&self, parent_id: u32, lock: Arc<Mutex<()>>) {
        let mut parents = self.parents.lock().await;
        // The map and `lock` itself
        if Arc::strong_count(&lock) == 2 {
            parents.remove(&parent_id);
        }
    }

    /// Move the sibling at `from` to `to` within `siblings`, the caller's view
    /// of the children of `parent_id`.
    pub async fn reorder(
        &self,
        parent_id: u32,
        siblings: &[S::Item],
        from: usize,
        to: usize,
    ) -> Result<ReorderOutcome<S::Item>, ReorderError> {
        let plan = ReorderPlan::for_move(siblings, from, to)?;
        if plan.is_noop() {
            return Ok(ReorderOutcome {
                siblings: siblings.to_vec(),
                writes: 0,
            });
        }

        let lock = self.parent_lock(parent_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.execute(parent_id, siblings, &plan).await
        };
        self.release(parent_id, lock).await;
        result
    }

    /// Like [`Reorderer::reorder`], but reads the sibling list from the store
    /// after taking the parent lock, so queued reorders see each other's result.
    pub async fn reorder_current(
        &self,
        parent_id: u32,
        from: usize,
        to: usize,
    ) -> Result<ReorderOutcome<S::Item>, ReorderError> {
        let lock = self.parent_lock(parent_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.reorder_loaded(parent_id, from, to).await
        };
        self.release(parent_id, lock).await;
        result
    }

    async fn reorder_loaded(
        &self,
        parent_id: u32,
        from: usize,
        to: usize,
    ) -> Result<ReorderOutcome<S::Item>, ReorderError> {
        let siblings = self
            .store
            .list_siblings(parent_id)
            .await
            .map_err(ReorderError::Load)?;
        let plan = ReorderPlan::for_move(&siblings, from, to)?;
        if plan.is_noop() {
            return Ok(ReorderOutcome { siblings, writes: 0 });
        }
        self.execute(parent_id, &siblings, &plan).await
    }

    async fn execute(
        &self,
        parent_id: u32,
        siblings: &[S::Item],
        plan: &ReorderPlan,
    ) -> Result<ReorderOutcome<S::Item>, ReorderError> {
        match write_back(self.store.as_ref(), plan).await {
            Ok(writes) => {
                tracing::info!(parent_id, writes, "siblings reordered");
                Ok(ReorderOutcome {
                    siblings: plan.apply(siblings),
                    writes,
                })
            }
            Err(e) => {
                tracing::warn!(parent_id, error = %e, "reorder aborted");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::moves::Sequenced;
    use crate::testing::RecordingStore;

    fn orders_of<T: Sequenced>(siblings: &[T]) -> Vec<i32> {
        siblings.iter().map(|s| s.order()).collect()
    }

    #[tokio::test]
    async fn test_move_first_to_last_writes_both_passes() {
        let store = RecordingStore::with_siblings(1, &[(1, 1), (2, 2), (3, 3)]);
        let siblings = store.list_siblings(1).await.unwrap();
        let plan = ReorderPlan::for_move(&siblings, 0, 2).unwrap();

        let writes = write_back(&store, &plan).await.unwrap();

        assert_eq!(writes, 6);
        assert_eq!(
            store.writes(),
            vec![(2, 10000), (3, 10001), (1, 10002), (2, 1), (3, 2), (1, 3)]
        );
        assert_eq!(store.orders(1), vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[tokio::test]
    async fn test_swap_never_collides() {
        // The store rejects any duplicate, so success means no intermediate clash
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2)]));
        let reorderer = Reorderer::new(store.clone());
        let siblings = store.list_siblings(1).await.unwrap();

        let outcome = reorderer.reorder(1, &siblings, 0, 1).await.unwrap();

        assert_eq!(outcome.writes, 4);
        assert_eq!(orders_of(&outcome.siblings), vec![1, 2]);
        assert_eq!(store.orders(1), vec![(2, 1), (1, 2)]);
    }

    #[tokio::test]
    async fn test_noop_move_issues_no_writes() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2), (3, 3)]));
        let reorderer = Reorderer::new(store.clone());
        let siblings = store.list_siblings(1).await.unwrap();

        let outcome = reorderer.reorder(1, &siblings, 2, 2).await.unwrap();

        assert_eq!(outcome.writes, 0);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_commit_stops_remaining_writes() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2), (3, 3)]));
        // Stage writes are 0..3, first commit write is 3, second is 4
        store.fail_write(4);
        let reorderer = Reorderer::new(store.clone());
        let siblings = store.list_siblings(1).await.unwrap();

        let err = reorderer.reorder(1, &siblings, 0, 2).await.unwrap_err();

        match err {
            ReorderError::Write {
                phase,
                id,
                completed,
                source,
            } => {
                assert_eq!(phase, Phase::Commit);
                assert_eq!(id, 3);
                assert_eq!(completed, 4);
                assert!(matches!(source, StoreError::Transport(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.writes().len(), 4);
        // Intermediate state, still free of duplicates
        let orders: Vec<i32> = store.orders(1).into_iter().map(|(_, o)| o).collect();
        assert_eq!(orders, vec![1, 10001, 10002]);
    }

    #[tokio::test]
    async fn test_reorder_after_failed_commit_restores_dense_orders() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2), (3, 3)]));
        // First commit write
        store.fail_write(3);
        let reorderer = Reorderer::new(store.clone());

        let err = reorderer.reorder_current(1, 0, 2).await.unwrap_err();
        assert!(matches!(err, ReorderError::Write { phase: Phase::Commit, .. }));
        assert_eq!(store.orders(1), vec![(2, 10000), (3, 10001), (1, 10002)]);

        let outcome = reorderer.reorder_current(1, 2, 0).await.unwrap();

        assert_eq!(outcome.writes, 6);
        assert_eq!(store.orders(1), vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(orders_of(&outcome.siblings), vec![1, 2, 3]);
        // Parked slots were never reused while still held
        assert_eq!(&store.writes()[3..6], &[(1, 10003), (2, 10004), (3, 10005)]);
    }

    #[tokio::test]
    async fn test_parent_locks_are_released() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2)]));
        store.insert(2, &[(3, 1), (4, 2)]);
        let reorderer = Reorderer::new(store.clone());
        let siblings = store.list_siblings(1).await.unwrap();

        reorderer.reorder(1, &siblings, 0, 1).await.unwrap();
        reorderer.reorder_current(2, 1, 0).await.unwrap();
        store.fail_write(8);
        reorderer.reorder_current(2, 0, 1).await.unwrap_err();

        assert!(reorderer.parents.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sequence_of_reorders_stays_dense() {
        let store = Arc::new(RecordingStore::with_siblings(
            9,
            &[(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)],
        ));
        let reorderer = Reorderer::new(store.clone());

        for (from, to) in [(0, 4), (3, 1), (2, 2), (4, 0), (1, 3)] {
            reorderer.reorder_current(9, from, to).await.unwrap();
            let orders: Vec<i32> = store.orders(9).into_iter().map(|(_, o)| o).collect();
            assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        }
    }

    #[tokio::test]
    async fn test_overlapping_reorders_on_one_parent_are_serialized() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2), (3, 3), (4, 4)]));
        let reorderer = Arc::new(Reorderer::new(store.clone()));

        let handles: Vec<_> = [(0, 3), (3, 0), (1, 2), (2, 1)]
            .into_iter()
            .map(|(from, to)| {
                let reorderer = reorderer.clone();
                tokio::spawn(async move { reorderer.reorder_current(1, from, to).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let orders: Vec<i32> = store.orders(1).into_iter().map(|(_, o)| o).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_stale_list_surfaces_conflict() {
        let store = Arc::new(RecordingStore::with_siblings(1, &[(1, 1), (2, 2)]));
        // A sibling the caller has not seen yet already holds order 3
        store.insert(1, &[(3, 3)]);
        let reorderer = Reorderer::new(store.clone());
        let stale = crate::testing::slots(&[(1, 1), (2, 2), (4, 4)]);

        let err = reorderer.reorder(1, &stale, 0, 2).await.unwrap_err();
        assert!(matches!(
            err.store_error(),
            Some(StoreError::NotFound(_)) | Some(StoreError::Conflict(_))
        ));
    }
}
