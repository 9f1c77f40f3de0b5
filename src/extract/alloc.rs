//! Error code allocation
//!
//! Codes are handed out above the largest code ever recorded. Gaps left by
//! hand-edited maps are never filled, so a code is never reused for a
//! different message.

use crate::extract::error::StoreError;

/// Next free code for a map holding `ids`: 0 for an empty map, otherwise
/// one past the largest id
pub fn next_id<I>(ids: I) -> Result<u32, StoreError>
where
    I: IntoIterator<Item = u32>,
{
    match ids.into_iter().max() {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdOverflow),
    }
}

/// Sequential allocator seeded from a loaded map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    /// `None` once `u32::MAX` has been handed out
    next: Option<u32>,
}

impl IdAllocator {
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self {
            next: next_id(ids).ok(),
        }
    }

    /// The code the next call to [`allocate`](Self::allocate) returns
    pub fn peek(&self) -> Option<u32> {
        self.next
    }

    pub fn allocate(&mut self) -> Result<u32, StoreError> {
        let id = self.next.ok_or(StoreError::IdOverflow)?;
        self.next = id.checked_add(1);
        Ok(id)
    }

    /// Number of codes still available
    pub fn remaining(&self) -> u64 {
        match self.next {
            Some(next) => u64::from(u32::MAX) - u64::from(next) + 1,
            None => 0,
        }
    }
}
