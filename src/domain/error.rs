//! Failures the store surfaces to callers.
//!
//! Routine misses (an absent item, a zero affected-count, an unprovisioned
//! store) are values, not errors. Only conflicts and genuine faults end up
//! here.

use thiserror::Error;

use super::todo_item::TodoItemId;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record changed between the existence check and the write.
    #[error("todo item {0} was modified concurrently")]
    Conflict(TodoItemId),

    /// Any other failure of the underlying medium.
    #[error("store fault: {0}")]
    Fault(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl StoreError {
    pub fn fault<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Fault(Box::new(err))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Outcome of a read against a store that may not be provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability<T> {
    Available(T),
    Unavailable,
}

impl<T> Availability<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Availability::Available(value) => Some(value),
            Availability::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Availability::Unavailable)
    }
}
