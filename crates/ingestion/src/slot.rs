//! Latest-wins sample slot.
//!
//! A single cell shared by the ingress task (writer) and the fusion loop
//! (reader). Writes replace whatever is there; `take` removes the value, so a
//! sample is consumed at most once.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::ImuSample;

/// Single-cell exchange holding at most one unread sample.
#[derive(Debug, Default)]
pub struct SampleSlot {
    cell: Mutex<Option<ImuSample>>,
}

impl SampleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `sample`, replacing any unread one.
    ///
    /// Returns `true` if an unread sample was discarded.
    pub fn write(&self, sample: ImuSample) -> bool {
        self.lock().replace(sample).is_some()
    }

    /// Remove and return the unread sample, if any.
    pub fn take(&self) -> Option<ImuSample> {
        self.lock().take()
    }

    /// Whether a sample is waiting.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    // The cell holds plain data, so a panic elsewhere cannot leave it torn.
    fn lock(&self) -> MutexGuard<'_, Option<ImuSample>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
