//! Store abstraction over the board collaborator.
//!
//! The collaborator surface is small: ordered entries under push-generated
//! keys, a last-write-wins timestamp, and whole-snapshot change
//! notifications. The server embeds [`MemoryStore`]; remote clients reach
//! the same surface over the wire protocol in [`crate::sync`].

mod memory;

pub use memory::MemoryStore;

use crate::entry::{EntryKey, EntrySnapshot, TextEntry};
use std::future::Future;
use std::pin::Pin;
use std::sync::mpsc::Receiver;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error("store error: {0}")]
    Other(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Push notification from the store.
///
/// Entry notifications always carry the entire current collection.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Entries(EntrySnapshot),
    LastSubmission(u64),
}

/// Receiving end of a store subscription.
///
/// Dropping the subscription unsubscribes; the store prunes closed
/// channels on the next notification.
pub struct StoreSubscription {
    rx: Receiver<StoreEvent>,
}

impl StoreSubscription {
    /// Next pending notification, if any (non-blocking).
    pub fn try_next(&self) -> Option<StoreEvent> {
        self.rx.try_recv().ok()
    }

    /// Block until the next notification; `None` once the store is gone.
    pub fn next(&self) -> Option<StoreEvent> {
        self.rx.recv().ok()
    }

    /// Drain all pending notifications.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.rx.try_iter().collect()
    }
}

/// A board store backend.
pub trait BoardStore: Send + Sync {
    /// The full current entry collection.
    fn snapshot(&self) -> BoxFuture<'_, StoreResult<EntrySnapshot>>;

    /// The shared last-submission timestamp.
    fn last_submission(&self) -> BoxFuture<'_, StoreResult<u64>>;

    /// Append an entry; the store assigns and returns a fresh ordered key.
    fn push_entry(&self, entry: &TextEntry) -> BoxFuture<'_, StoreResult<EntryKey>>;

    /// Last-write-wins overwrite of the shared timestamp.
    fn set_last_submission(&self, value: u64) -> BoxFuture<'_, StoreResult<()>>;

    /// Delete an entry by key.
    fn remove_entry(&self, key: &EntryKey) -> BoxFuture<'_, StoreResult<()>>;

    /// Subscribe to change notifications. The current snapshot and
    /// timestamp are delivered immediately, like the remote service does
    /// on attach.
    fn subscribe(&self) -> StoreSubscription;
}
