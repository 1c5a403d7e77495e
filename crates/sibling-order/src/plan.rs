//! Two-phase reorder plans
//!
//! A plan lists, for every sibling whose order changes, a staged value in the
//! temporary namespace and its final value. Writing every staged value before
//! any final value keeps the sibling set free of duplicates at each step.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::moves::{array_move, Sequenced};

/// First value of the temporary namespace. Legitimate orders stay below it.
pub const TEMP_ORDER_BASE: i32 = 10_000;

/// Exclusive ceiling for any order a store should accept. Staged values stay
/// below it even when an aborted write-back left siblings parked.
pub const ORDER_LIMIT: i32 = TEMP_ORDER_BASE * 3;

/// The two passes of a write-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Park changed siblings in the temporary namespace.
    Stage,
    /// Write final, dense orders.
    Commit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Stage => write!(f, "stage"),
            Phase::Commit => write!(f, "commit"),
        }
    }
}

/// One sibling whose order changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderChange {
    pub id: u32,
    pub current: i32,
    pub staged: i32,
    pub target: i32,
}

/// A single `{ id, newOrder }` entry of a [`ReorderRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMove {
    pub id: u32,
    pub new_order: i32,
}

/// Explicit request to rearrange the children of one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub parent_id: u32,
    pub moves: Vec<OrderMove>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderPlan {
    /// Every sibling as `(id, final order)`, in final display order.
    arrangement: Vec<(u32, i32)>,
    /// Changed siblings, in final display order.
    changes: Vec<OrderChange>,
}

impl ReorderPlan {
    /// A plan that writes nothing and keeps `siblings` as they are.
    pub fn noop<T: Sequenced>(siblings: &[T]) -> Self {
        Self {
            arrangement: siblings.iter().map(|s| (s.id(), s.order())).collect(),
            changes: Vec::new(),
        }
    }

    /// Plan moving the sibling at `from` to `to` (indices into the display list).
    ///
    /// Indices are checked first; same-index moves then produce a no-op plan.
    pub fn for_move<T: Sequenced>(siblings: &[T], from: usize, to: usize) -> Result<Self, PlanError> {
        let len = siblings.len();
        if let Some(index) = [from, to].into_iter().find(|&index| index >= len) {
            return Err(PlanError::IndexOutOfBounds { index, len });
        }
        if from == to {
            return Ok(Self::noop(siblings));
        }

        let mut arranged: Vec<&T> = siblings.iter().collect();
        array_move(&mut arranged, from, to)?;
        Self::for_arrangement(arranged)
    }

    /// Plan giving an already rearranged list the dense orders `1..=N`.
    pub fn for_arrangement<'a, T, I>(arranged: I) -> Result<Self, PlanError>
    where
        T: Sequenced + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let arranged: Vec<&T> = arranged.into_iter().collect();
        ensure_capacity(arranged.len())?;
        let staging = staging_slots(arranged.len(), arranged.iter().map(|s| s.order()));

        let mut seen = HashSet::with_capacity(arranged.len());
        let mut plan = Self::default();

        for (index, sibling) in arranged.iter().enumerate() {
            if !seen.insert(sibling.id()) {
                return Err(PlanError::DuplicateSibling(sibling.id()));
            }
            // Bounded by ensure_capacity
            let target = index as i32 + 1;
            plan.arrangement.push((sibling.id(), target));
            if sibling.order() != target {
                plan.changes.push(OrderChange {
                    id: sibling.id(),
                    current: sibling.order(),
                    staged: staging[index],
                    target,
                });
            }
        }

        Ok(plan)
    }

    /// Rebuild a plan from a wire request against the current sibling set.
    ///
    /// Siblings the request does not mention keep their order. Requested
    /// orders must stay below [`TEMP_ORDER_BASE`] and the result unique.
    pub fn from_request<T: Sequenced>(request: &ReorderRequest, siblings: &[T]) -> Result<Self, PlanError> {
        ensure_capacity(siblings.len())?;

        let current: HashMap<u32, i32> = siblings.iter().map(|s| (s.id(), s.order())).collect();
        let mut finals = current.clone();
        let mut mentioned = HashSet::with_capacity(request.moves.len());

        for mv in &request.moves {
            if !current.contains_key(&mv.id) {
                return Err(PlanError::UnknownSibling(mv.id));
            }
            if !mentioned.insert(mv.id) {
                return Err(PlanError::DuplicateSibling(mv.id));
            }
            if mv.new_order < 1 || mv.new_order >= TEMP_ORDER_BASE {
                return Err(PlanError::InvalidOrder(mv.new_order));
            }
            finals.insert(mv.id, mv.new_order);
        }

        let mut taken = HashSet::with_capacity(siblings.len());
        let mut arrangement = Vec::with_capacity(siblings.len());
        for sibling in siblings {
            let order = finals[&sibling.id()];
            if !taken.insert(order) {
                return Err(PlanError::DuplicateOrder(order));
            }
            arrangement.push((sibling.id(), order));
        }
        arrangement.sort_by_key(|&(id, order)| (order, id));

        let staging = staging_slots(siblings.len(), siblings.iter().map(|s| s.order()));
        let changes = arrangement
            .iter()
            .zip(staging)
            .filter(|((id, order), _)| current[id] != *order)
            .map(|(&(id, target), staged)| OrderChange {
                id,
                current: current[&id],
                staged,
                target,
            })
            .collect();

        Ok(Self { arrangement, changes })
    }

    pub fn arrangement(&self) -> &[(u32, i32)] {
        &self.arrangement
    }

    pub fn changes(&self) -> &[OrderChange] {
        &self.changes
    }

    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Total number of store writes across both passes.
    pub fn write_count(&self) -> usize {
        self.changes.len() * 2
    }

    /// `(id, order)` writes of one pass, in issue order.
    pub fn writes(&self, phase: Phase) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.changes.iter().map(move |change| match phase {
            Phase::Stage => (change.id, change.staged),
            Phase::Commit => (change.id, change.target),
        })
    }

    /// Siblings rearranged into final order with their final order values.
    ///
    /// Siblings unknown to the plan are dropped.
    pub fn apply<T: Sequenced + Clone>(&self, siblings: &[T]) -> Vec<T> {
        let by_id: HashMap<u32, &T> = siblings.iter().map(|s| (s.id(), s)).collect();
        self.arrangement
            .iter()
            .filter_map(|&(id, order)| {
                by_id.get(&id).map(|sibling| {
                    let mut sibling = (*sibling).clone();
                    sibling.set_order(order);
                    sibling
                })
            })
            .collect()
    }

    /// The request a server needs to apply this plan in one go.
    pub fn to_request(&self, parent_id: u32) -> ReorderRequest {
        ReorderRequest {
            parent_id,
            moves: self
                .changes
                .iter()
                .map(|change| OrderMove {
                    id: change.id,
                    new_order: change.target,
                })
                .collect(),
        }
    }
}

fn ensure_capacity(len: usize) -> Result<(), PlanError> {
    if len >= TEMP_ORDER_BASE as usize {
        return Err(PlanError::TemporaryRangeExhausted(TEMP_ORDER_BASE));
    }
    Ok(())
}

/// The first `count` values from [`TEMP_ORDER_BASE`] up that no current order
/// holds. Siblings parked by an aborted write-back keep their slots reserved.
fn staging_slots(count: usize, orders: impl Iterator<Item = i32>) -> Vec<i32> {
    let held: HashSet<i32> = orders.filter(|&order| order >= TEMP_ORDER_BASE).collect();
    (TEMP_ORDER_BASE..ORDER_LIMIT)
        .filter(|order| !held.contains(order))
        .take(count)
        .collect()
}
