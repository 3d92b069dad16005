//! Canonical board state.

use crate::entry::{EntryKey, EntrySnapshot, TextEntry};
use crate::keys::KeyGenerator;

/// The canonical entry collection plus the shared last-submission
/// timestamp.
///
/// The store owns this state; clients only ever hold snapshots derived
/// from it.
#[derive(Debug, Default)]
pub struct Board {
    entries: EntrySnapshot,
    last_submission_ms: u64,
    keys: KeyGenerator,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry under a fresh ordered key.
    pub fn push(&mut self, entry: TextEntry) -> EntryKey {
        let key = self.keys.next_key();
        self.entries.insert(key.clone(), entry.into());
        key
    }

    /// Remove an entry. Returns false when the key is unknown.
    pub fn remove(&mut self, key: &EntryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Last-write-wins overwrite of the shared timestamp.
    pub fn set_last_submission(&mut self, value: u64) {
        self.last_submission_ms = value;
    }

    pub fn last_submission(&self) -> u64 {
        self.last_submission_ms
    }

    /// The full current collection.
    pub fn snapshot(&self) -> EntrySnapshot {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
