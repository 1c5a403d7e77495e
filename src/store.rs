//! Optimistic Sibling Cache
//!
//! Holds the list the server last confirmed next to the list being shown.
//! Moves land in the shown list immediately and are promoted once the
//! server has accepted them.

use sibling_order::{array_move, PlanError, Sequenced};

#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    parent_id: u32,
    confirmed: Vec<T>,
    view: Vec<T>,
}

impl<T: Sequenced + Clone> OptimisticList<T> {
    pub fn new(parent_id: u32, items: Vec<T>) -> Self {
        let items = sorted(items);
        Self {
            parent_id,
            confirmed: items.clone(),
            view: items,
        }
    }

    pub fn parent_id(&self) -> u32 {
        self.parent_id
    }

    /// The list as it should be rendered
    pub fn items(&self) -> &[T] {
        &self.view
    }

    pub fn confirmed(&self) -> &[T] {
        &self.confirmed
    }

    /// Move an entry of the rendered list. Orders are left untouched until commit.
    pub fn apply_move(&mut self, from: usize, to: usize) -> Result<(), PlanError> {
        array_move(&mut self.view, from, to)
    }

    /// Accept the rendered list, renumbering it `1..=N`.
    pub fn commit(&mut self) {
        for (index, item) in self.view.iter_mut().enumerate() {
            item.set_order(index as i32 + 1);
        }
        self.confirmed = self.view.clone();
    }

    /// Replace both lists with what the server returned.
    pub fn reconcile(&mut self, fresh: Vec<T>) {
        let fresh = sorted(fresh);
        self.confirmed = fresh.clone();
        self.view = fresh;
    }

    /// Drop unconfirmed moves.
    pub fn rollback(&mut self) {
        self.view = self.confirmed.clone();
    }

    pub fn is_dirty(&self) -> bool {
        self.view.len() != self.confirmed.len()
            || self
                .view
                .iter()
                .zip(&self.confirmed)
                .any(|(v, c)| v.id() != c.id() || v.order() != c.order())
    }

    /// Insert or replace an entry confirmed by the server
    pub fn upsert(&mut self, item: T) {
        for list in [&mut self.confirmed, &mut self.view] {
            match list.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => *existing = item.clone(),
                None => list.push(item.clone()),
            }
        }
        self.confirmed.sort_by_key(|i| i.order());
        self.view.sort_by_key(|i| i.order());
    }

    /// Remove an entry by ID from both lists
    pub fn remove(&mut self, id: u32) {
        self.confirmed.retain(|item| item.id() != id);
        self.view.retain(|item| item.id() != id);
    }
}

fn sorted<T: Sequenced>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by_key(|item| item.order());
    items
}
