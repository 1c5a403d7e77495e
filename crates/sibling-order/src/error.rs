use thiserror::Error;

use crate::plan::Phase;

/// Why a reorder could not be planned. No write has been issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("index {index} is out of bounds for {len} siblings")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("sibling set no longer fits below the temporary order range ({0})")]
    TemporaryRangeExhausted(i32),

    #[error("sibling {0} is not part of this sibling set")]
    UnknownSibling(u32),

    #[error("sibling {0} appears more than once")]
    DuplicateSibling(u32),

    #[error("order {0} is assigned more than once")]
    DuplicateOrder(i32),

    #[error("order {0} is not a positive integer")]
    InvalidOrder(i32),
}

/// Failure reported by a [`crate::SiblingStore`] for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The `(parent, order)` uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Failure of a whole reorder operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A write failed; the remaining writes of the operation were not issued.
    #[error("{phase} write for sibling {id} failed after {completed} writes: {source}")]
    Write {
        phase: Phase,
        id: u32,
        completed: usize,
        #[source]
        source: StoreError,
    },

    #[error("could not load siblings: {0}")]
    Load(#[source] StoreError),
}

impl ReorderError {
    /// The store error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ReorderError::Plan(_) => None,
            ReorderError::Write { source, .. } => Some(source),
            ReorderError::Load(source) => Some(source),
        }
    }
}
