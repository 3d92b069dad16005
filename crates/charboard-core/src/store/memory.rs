//! In-memory board store.

use super::{
    BoardStore, BoxFuture, StoreError, StoreEvent, StoreResult, StoreSubscription,
};
use crate::board::Board;
use crate::entry::{EntryKey, EntrySnapshot, TextEntry};
use std::sync::mpsc::{channel, Sender};
use std::sync::Mutex;

/// In-process store backing the server and tests.
///
/// Provides the collaborator semantics directly: append generates a
/// unique ordered key, the timestamp overwrite is last-write-wins, and
/// every mutation notifies all subscribers with the whole collection.
#[derive(Default)]
pub struct MemoryStore {
    board: Mutex<Board>,
    watchers: Mutex<Vec<Sender<StoreEvent>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, event: &StoreEvent) {
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Other(format!("lock error: {e}"))
}

impl BoardStore for MemoryStore {
    fn snapshot(&self) -> BoxFuture<'_, StoreResult<EntrySnapshot>> {
        Box::pin(async move {
            let board = self.board.lock().map_err(lock_error)?;
            Ok(board.snapshot())
        })
    }

    fn last_submission(&self) -> BoxFuture<'_, StoreResult<u64>> {
        Box::pin(async move {
            let board = self.board.lock().map_err(lock_error)?;
            Ok(board.last_submission())
        })
    }

    fn push_entry(&self, entry: &TextEntry) -> BoxFuture<'_, StoreResult<EntryKey>> {
        let entry = entry.clone();
        Box::pin(async move {
            let (key, snapshot) = {
                let mut board = self.board.lock().map_err(lock_error)?;
                let key = board.push(entry);
                (key, board.snapshot())
            };
            self.notify(&StoreEvent::Entries(snapshot));
            Ok(key)
        })
    }

    fn set_last_submission(&self, value: u64) -> BoxFuture<'_, StoreResult<()>> {
        Box::pin(async move {
            {
                let mut board = self.board.lock().map_err(lock_error)?;
                board.set_last_submission(value);
            }
            self.notify(&StoreEvent::LastSubmission(value));
            Ok(())
        })
    }

    fn remove_entry(&self, key: &EntryKey) -> BoxFuture<'_, StoreResult<()>> {
        let key = key.clone();
        Box::pin(async move {
            let snapshot = {
                let mut board = self.board.lock().map_err(lock_error)?;
                if !board.remove(&key) {
                    return Err(StoreError::NotFound(key.to_string()));
                }
                board.snapshot()
            };
            self.notify(&StoreEvent::Entries(snapshot));
            Ok(())
        })
    }

    fn subscribe(&self) -> StoreSubscription {
        let (tx, rx) = channel();
        if let Ok(board) = self.board.lock() {
            let _ = tx.send(StoreEvent::Entries(board.snapshot()));
            let _ = tx.send(StoreEvent::LastSubmission(board.last_submission()));
        }
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.push(tx);
        }
        StoreSubscription { rx }
    }
}
