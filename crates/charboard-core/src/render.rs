//! Derivation of the rendered board view from a snapshot.

use crate::admin::AdminSession;
use crate::entry::{EntryKey, EntrySnapshot};

/// One rendered entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub key: EntryKey,
    pub ch: String,
    /// Submitted after the current admin session began.
    pub highlighted: bool,
    /// Delete affordance shown (admin only).
    pub deletable: bool,
}

/// The fully derived view of the board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    /// Concatenation of all live characters in key order.
    pub text: String,
    pub rows: Vec<EntryRow>,
}

/// Re-derive the whole view from a snapshot.
///
/// Runs on every change notification and replaces the previous view
/// wholesale; there is no incremental patching. Admin highlighting is
/// recomputed here on each call rather than cached, so logging in marks
/// already-loaded entries retroactively.
pub fn render(snapshot: &EntrySnapshot, admin: Option<&AdminSession>) -> BoardView {
    let mut text = String::new();
    let mut rows = Vec::with_capacity(snapshot.len());

    for (key, value) in snapshot.iter() {
        let entry = value.normalize();
        text.push_str(&entry.ch);
        rows.push(EntryRow {
            key: key.clone(),
            ch: entry.ch,
            highlighted: admin.is_some_and(|a| a.is_recent(entry.submitted_at)),
            deletable: admin.is_some(),
        });
    }

    BoardView { text, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{AdminSession, ADMIN_PASSWORD};
    use crate::entry::{EntryValue, TextEntry};

    fn snapshot_of(values: &[(&str, EntryValue)]) -> EntrySnapshot {
        let mut snapshot = EntrySnapshot::new();
        for (key, value) in values {
            snapshot.insert(EntryKey::from(*key), value.clone());
        }
        snapshot
    }

    #[test]
    fn test_renders_entries_in_key_order() {
        let snapshot = snapshot_of(&[
            ("k1", TextEntry::new("h", 1).into()),
            ("k2", TextEntry::new("i", 2).into()),
        ]);
        let view = render(&snapshot, None);
        assert_eq!(view.text, "hi");
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows.iter().all(|r| !r.deletable && !r.highlighted));
    }

    #[test]
    fn test_empty_snapshot_renders_empty_text() {
        let view = render(&EntrySnapshot::new(), None);
        assert_eq!(view.text, "");
        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let snapshot = snapshot_of(&[
            ("k1", TextEntry::new("가", 1).into()),
            ("k2", EntryValue::Legacy("나".into())),
        ]);
        assert_eq!(render(&snapshot, None), render(&snapshot, None));
    }

    #[test]
    fn test_legacy_and_record_shapes_render_identically() {
        let legacy = snapshot_of(&[("k1", EntryValue::Legacy("x".into()))]);
        let record = snapshot_of(&[("k1", TextEntry::new("x", 77).into())]);
        assert_eq!(render(&legacy, None).text, render(&record, None).text);
    }

    #[test]
    fn test_admin_rows_are_deletable() {
        let admin = AdminSession::login(ADMIN_PASSWORD, 100).unwrap();
        let snapshot = snapshot_of(&[("k1", TextEntry::new("a", 1).into())]);
        let view = render(&snapshot, Some(&admin));
        assert!(view.rows[0].deletable);
    }

    #[test]
    fn test_highlight_marks_entries_after_login_only() {
        let admin = AdminSession::login(ADMIN_PASSWORD, 1_000).unwrap();
        let snapshot = snapshot_of(&[
            ("k1", TextEntry::new("a", 999).into()),
            ("k2", TextEntry::new("b", 1_001).into()),
            // Legacy entries have no submission time and never highlight.
            ("k3", EntryValue::Legacy("c".into())),
        ]);
        let view = render(&snapshot, Some(&admin));
        assert!(!view.rows[0].highlighted);
        assert!(view.rows[1].highlighted);
        assert!(!view.rows[2].highlighted);
    }
}
