//! Entry data model for the shared board.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-assigned entry identity.
///
/// Keys are ULIDs in text form, so lexicographic order equals creation
/// order and iterating a snapshot by key reproduces insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryKey(pub String);

impl EntryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntryKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One contributed character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEntry {
    /// The contributed character (a single grapheme).
    #[serde(rename = "char")]
    pub ch: String,
    /// Client-side submission time, milliseconds since epoch.
    #[serde(rename = "submittedAt")]
    pub submitted_at: u64,
}

impl TextEntry {
    pub fn new(ch: impl Into<String>, submitted_at: u64) -> Self {
        Self {
            ch: ch.into(),
            submitted_at,
        }
    }
}

/// Stored representation of an entry value.
///
/// Early boards stored bare character strings; current boards store a
/// `{char, submittedAt}` record. Both shapes remain readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    /// Current record shape.
    Record(TextEntry),
    /// Legacy bare character.
    Legacy(String),
}

impl EntryValue {
    /// Normalize into the current record shape.
    ///
    /// Legacy values carry no submission time; they normalize to 0 so they
    /// never count as newer than an admin login.
    pub fn normalize(&self) -> TextEntry {
        match self {
            EntryValue::Record(entry) => entry.clone(),
            EntryValue::Legacy(ch) => TextEntry::new(ch.clone(), 0),
        }
    }

    /// The contributed character, independent of shape.
    pub fn ch(&self) -> &str {
        match self {
            EntryValue::Record(entry) => &entry.ch,
            EntryValue::Legacy(ch) => ch,
        }
    }
}

impl From<TextEntry> for EntryValue {
    fn from(entry: TextEntry) -> Self {
        EntryValue::Record(entry)
    }
}

/// The full ordered entry collection as delivered by the store.
///
/// Snapshots are always whole: every change notification carries the
/// entire current collection, never a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntrySnapshot {
    entries: BTreeMap<EntryKey, EntryValue>,
}

impl EntrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &EntryKey) -> Option<&EntryValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: EntryKey, value: EntryValue) {
        self.entries.insert(key, value);
    }

    pub fn remove(&mut self, key: &EntryKey) -> Option<EntryValue> {
        self.entries.remove(key)
    }

    /// Entries in key order (insertion order, by key construction).
    pub fn iter(&self) -> impl Iterator<Item = (&EntryKey, &EntryValue)> {
        self.entries.iter()
    }
}
