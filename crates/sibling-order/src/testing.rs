//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::moves::Sequenced;
use crate::store::SiblingStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: u32,
    pub order: i32,
}

impl Slot {
    pub fn new(id: u32, order: i32) -> Self {
        Self { id, order }
    }
}

impl Sequenced for Slot {
    fn id(&self) -> u32 {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }
}

pub fn slots(pairs: &[(u32, i32)]) -> Vec<Slot> {
    pairs.iter().map(|&(id, order)| Slot::new(id, order)).collect()
}

#[derive(Default)]
struct Inner {
    /// id -> (parent, order)
    rows: HashMap<u32, (u32, i32)>,
    writes: Vec<(u32, i32)>,
    fail_at: Option<usize>,
}

/// In-memory store enforcing `(parent, order)` uniqueness on every write.
#[derive(Default)]
pub struct RecordingStore {
    inner: Mutex<Inner>,
}

impl RecordingStore {
    pub fn with_siblings(parent_id: u32, pairs: &[(u32, i32)]) -> Self {
        let store = Self::default();
        store.insert(parent_id, pairs);
        store
    }

    pub fn insert(&self, parent_id: u32, pairs: &[(u32, i32)]) {
        let mut inner = self.inner.lock().unwrap();
        for &(id, order) in pairs {
            inner.rows.insert(id, (parent_id, order));
        }
    }

    /// Fail the write with this zero-based index with a transport error.
    pub fn fail_write(&self, index: usize) {
        self.inner.lock().unwrap().fail_at = Some(index);
    }

    pub fn writes(&self) -> Vec<(u32, i32)> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn orders(&self, parent_id: u32) -> Vec<(u32, i32)> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<_> = inner
            .rows
            .iter()
            .filter(|(_, (parent, _))| *parent == parent_id)
            .map(|(id, (_, order))| (*id, *order))
            .collect();
        orders.sort_by_key(|&(_, order)| order);
        orders
    }
}

#[async_trait]
impl SiblingStore for RecordingStore {
    type Item = Slot;

    async fn list_siblings(&self, parent_id: u32) -> Result<Vec<Slot>, StoreError> {
        Ok(self
            .orders(parent_id)
            .into_iter()
            .map(|(id, order)| Slot::new(id, order))
            .collect())
    }

    async fn update_order(&self, id: u32, order: i32) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = inner.writes.len();
        if inner.fail_at == Some(attempt) {
            inner.fail_at = None;
            return Err(StoreError::Transport(format!("write {} dropped", attempt)));
        }

        let (parent, _) = *inner
            .rows
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("sibling {}", id)))?;
        let clash = inner
            .rows
            .iter()
            .any(|(other, (p, o))| *other != id && *p == parent && *o == order);
        if clash {
            return Err(StoreError::Conflict(format!("order {} taken under {}", order, parent)));
        }

        inner.rows.insert(id, (parent, order));
        inner.writes.push((id, order));
        Ok(())
    }
}
