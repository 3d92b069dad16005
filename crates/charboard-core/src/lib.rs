//! Charboard Core Library
//!
//! Platform-agnostic state and logic for the shared one-character text
//! board: the entry model, cooldown evaluation, admin session, the store
//! abstraction, and the synchronization client.

pub mod admin;
pub mod board;
pub mod client;
pub mod cooldown;
pub mod entry;
pub mod keys;
pub mod render;
pub mod store;
pub mod sync;

pub use admin::AdminSession;
pub use board::Board;
pub use client::BoardClient;
pub use cooldown::{CooldownStatus, SUBMISSION_INTERVAL_MS};
pub use entry::{EntryKey, EntrySnapshot, EntryValue, TextEntry};
pub use render::{render, BoardView, EntryRow};
pub use sync::{ClientMessage, ConnectionState, NativeWebSocket, ServerMessage, SyncEvent};
