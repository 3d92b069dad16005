//! Client-side board state and submission control.

use crate::admin::AdminSession;
use crate::cooldown::CooldownStatus;
use crate::entry::{EntryKey, EntrySnapshot, TextEntry};
use crate::render::{render, BoardView};
use crate::sync::{ClientMessage, SyncEvent};
use log::{error, info};

/// Validation notice: input must be exactly one character.
pub const NOTICE_ONE_CHAR: &str = "정확히 한 글자만 입력해 주세요.";
/// Remote write failure during a submission.
pub const NOTICE_WRITE_FAILED: &str =
    "입력에 실패했습니다. 연결 상태 또는 권한을 확인해 주세요.";
/// Remote delete failure.
pub const NOTICE_DELETE_FAILED: &str = "삭제에 실패했습니다.";
/// Admin login succeeded.
pub const STATUS_ADMIN_OK: &str = "관리자 모드가 활성화되었습니다.";
/// Admin login failed.
pub const STATUS_ADMIN_FAIL: &str = "비밀번호가 올바르지 않습니다.";

/// A submission awaiting remote acknowledgment.
///
/// The timestamp overwrite is issued only after the entry append is
/// confirmed, so no observer can see an updated cooldown without the
/// entry already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingSubmission {
    AwaitingPush { submitted_at: u64 },
    AwaitingTimestamp { submitted_at: u64 },
}

/// The coordinating object for one client.
///
/// Replaces the free-floating globals of the original page: the derived
/// snapshot, the shared timestamp, the input buffer, and the optional
/// admin session all live here. The UI drives it with [`SyncEvent`]s and
/// flushes its outgoing queue to the socket.
#[derive(Debug, Default)]
pub struct BoardClient {
    snapshot: EntrySnapshot,
    last_submission_ms: u64,
    /// Set once the first timestamp notification arrives; submissions are
    /// held back until then, matching the initially-disabled affordance.
    synced: bool,
    input: String,
    admin: Option<AdminSession>,
    admin_status: Option<&'static str>,
    notice: Option<String>,
    pending: Option<PendingSubmission>,
    outgoing: Vec<ClientMessage>,
}

impl BoardClient {
    pub fn new() -> Self {
        Self::default()
    }

    // --- UI state access ---

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Mutable input buffer, for direct binding to a text field.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn last_submission_ms(&self) -> u64 {
        self.last_submission_ms
    }

    /// Whether the initial timestamp delivery has arrived. The submit
    /// affordance stays disabled until it has.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Evaluate the cooldown against the current local time.
    pub fn cooldown(&self, now_ms: u64) -> CooldownStatus {
        CooldownStatus::evaluate(self.last_submission_ms, now_ms)
    }

    /// Re-derive the rendered view from the current snapshot.
    pub fn view(&self) -> BoardView {
        render(&self.snapshot, self.admin.as_ref())
    }

    /// Take the pending user-facing notice, if any (alert-style, shown
    /// once).
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Queued outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    // --- Submission (4.2) ---

    /// Validate the input buffer and start a submission.
    pub fn submit(&mut self, now_ms: u64) {
        let ch = self.input.trim().to_string();
        if ch.chars().count() != 1 {
            self.notice = Some(NOTICE_ONE_CHAR.to_string());
            self.input.clear();
            return;
        }

        // The disabled button is the primary gate; this re-check only
        // covers paths that bypass it. Rejected silently.
        if !self.synced || !self.cooldown(now_ms).is_ready() {
            return;
        }
        if self.pending.is_some() {
            return;
        }

        self.outgoing.push(ClientMessage::Push {
            entry: TextEntry::new(ch, now_ms),
        });
        self.pending = Some(PendingSubmission::AwaitingPush {
            submitted_at: now_ms,
        });
    }

    // --- Admin (4.5) ---

    pub fn is_admin(&self) -> bool {
        self.admin.is_some()
    }

    pub fn admin(&self) -> Option<&AdminSession> {
        self.admin.as_ref()
    }

    /// Status line from the last login attempt.
    pub fn admin_status(&self) -> Option<&'static str> {
        self.admin_status
    }

    /// Attempt an admin login. A match retroactively affects rendering:
    /// the next `view()` carries delete affordances and highlights.
    pub fn login(&mut self, password: &str, now_ms: u64) -> bool {
        match AdminSession::login(password, now_ms) {
            Some(session) => {
                info!("admin session started");
                self.admin = Some(session);
                self.admin_status = Some(STATUS_ADMIN_OK);
                true
            }
            None => {
                self.admin = None;
                self.admin_status = Some(STATUS_ADMIN_FAIL);
                false
            }
        }
    }

    /// Delete an entry by key. No confirmation step; the removal shows up
    /// in the next snapshot notification.
    pub fn delete_entry(&mut self, key: &EntryKey) {
        if self.admin.is_none() {
            return;
        }
        self.outgoing.push(ClientMessage::Remove { key: key.clone() });
    }

    // --- Sync listener (4.1) and timestamp subscription (4.4) ---

    /// Apply one sync event to local state.
    pub fn handle_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Entries(snapshot) => {
                // Whole-snapshot replacement; the view is re-derived on
                // the next `view()` call.
                self.snapshot = snapshot;
            }
            SyncEvent::LastSubmission(value) => {
                self.synced = true;
                self.last_submission_ms = value;
                // Another client's racing overwrite must not pass for our
                // own: only the echo of our value completes the submission.
                if self.pending
                    == Some(PendingSubmission::AwaitingTimestamp {
                        submitted_at: value,
                    })
                {
                    // Submission complete: clear the field now rather than
                    // waiting for the next tick.
                    self.pending = None;
                    self.input.clear();
                }
            }
            SyncEvent::Pushed { key } => {
                if let Some(PendingSubmission::AwaitingPush { submitted_at }) = self.pending
                {
                    info!("entry appended under {key}");
                    self.outgoing.push(ClientMessage::SetLastSubmission {
                        value: submitted_at,
                    });
                    self.pending =
                        Some(PendingSubmission::AwaitingTimestamp { submitted_at });
                }
            }
            SyncEvent::Removed { key } => {
                info!("entry {key} removed");
            }
            SyncEvent::Error { message } => {
                error!("remote write failed: {message}");
                if self.pending.take().is_some() {
                    // Input and cooldown stay as if the submission had
                    // never been attempted.
                    self.notice = Some(NOTICE_WRITE_FAILED.to_string());
                } else if self.admin.is_some() {
                    self.notice = Some(NOTICE_DELETE_FAILED.to_string());
                }
            }
            SyncEvent::Connected | SyncEvent::Disconnected => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::ADMIN_PASSWORD;
    use crate::entry::EntryValue;

    fn push_payload(msg: &ClientMessage) -> &TextEntry {
        match msg {
            ClientMessage::Push { entry } => entry,
            _ => panic!("expected push"),
        }
    }

    fn snapshot_of(values: &[(&str, &str)]) -> EntrySnapshot {
        let mut snapshot = EntrySnapshot::new();
        for (key, ch) in values {
            snapshot.insert(EntryKey::from(*key), EntryValue::Legacy(ch.to_string()));
        }
        snapshot
    }

    /// A client that has received the initial timestamp delivery.
    fn synced_client() -> BoardClient {
        let mut client = BoardClient::new();
        client.handle_event(SyncEvent::LastSubmission(0));
        client
    }

    #[test]
    fn test_valid_submission_appends_then_sets_timestamp() {
        let mut client = synced_client();
        client.set_input(" h ");
        client.submit(100_000);

        let out = client.take_outgoing();
        assert_eq!(out.len(), 1);
        let entry = push_payload(&out[0]);
        assert_eq!(entry.ch, "h");
        assert_eq!(entry.submitted_at, 100_000);

        // Timestamp overwrite goes out only after the push is acked.
        assert!(!client.has_outgoing());
        client.handle_event(SyncEvent::Pushed {
            key: EntryKey::from("k1"),
        });
        let out = client.take_outgoing();
        assert!(matches!(
            out[..],
            [ClientMessage::SetLastSubmission { value: 100_000 }]
        ));

        // Input is cleared once the timestamp lands, and the cooldown is
        // in effect immediately.
        assert_eq!(client.input(), " h ");
        client.handle_event(SyncEvent::LastSubmission(100_000));
        assert_eq!(client.input(), "");
        assert!(!client.cooldown(100_001).is_ready());
    }

    #[test]
    fn test_invalid_input_is_rejected_locally() {
        let mut client = BoardClient::new();
        for input in ["", "  ", "ab", "한글"] {
            client.set_input(input);
            client.submit(100_000);
            assert!(!client.has_outgoing(), "no write for {input:?}");
            assert_eq!(client.input(), "");
            assert_eq!(client.take_notice().as_deref(), Some(NOTICE_ONE_CHAR));
        }
    }

    #[test]
    fn test_submission_during_cooldown_is_silently_dropped() {
        let mut client = BoardClient::new();
        client.handle_event(SyncEvent::LastSubmission(100_000));
        client.set_input("h");
        client.submit(100_500);
        assert!(!client.has_outgoing());
        assert!(client.take_notice().is_none());
        // Input stays; the user did not mistype.
        assert_eq!(client.input(), "h");
    }

    #[test]
    fn test_write_failure_leaves_state_untouched() {
        let mut client = synced_client();
        client.set_input("h");
        client.submit(100_000);
        client.take_outgoing();

        client.handle_event(SyncEvent::Error {
            message: "permission denied".to_string(),
        });
        assert_eq!(client.take_notice().as_deref(), Some(NOTICE_WRITE_FAILED));
        assert_eq!(client.input(), "h");
        assert_eq!(client.last_submission_ms(), 0);
        assert!(client.cooldown(100_001).is_ready());
        assert!(!client.has_outgoing());
    }

    #[test]
    fn test_snapshot_events_replace_the_view_wholesale() {
        let mut client = BoardClient::new();
        client.handle_event(SyncEvent::Entries(snapshot_of(&[("k1", "h"), ("k2", "i")])));
        assert_eq!(client.view().text, "hi");

        client.handle_event(SyncEvent::Entries(snapshot_of(&[("k2", "i")])));
        assert_eq!(client.view().text, "i");
    }

    #[test]
    fn test_timestamp_event_takes_effect_immediately() {
        let mut client = BoardClient::new();
        assert!(client.cooldown(100_000).is_ready());
        client.handle_event(SyncEvent::LastSubmission(95_000));
        assert_eq!(
            client.cooldown(100_000),
            CooldownStatus::Waiting { seconds_left: 55 }
        );
    }

    #[test]
    fn test_login_toggles_delete_affordances() {
        let mut client = BoardClient::new();
        client.handle_event(SyncEvent::Entries(snapshot_of(&[("k1", "h")])));
        assert!(!client.view().rows[0].deletable);

        assert!(!client.login("wrong", 1_000));
        assert_eq!(client.admin_status(), Some(STATUS_ADMIN_FAIL));
        assert!(!client.is_admin());

        assert!(client.login(ADMIN_PASSWORD, 1_000));
        assert_eq!(client.admin_status(), Some(STATUS_ADMIN_OK));
        assert!(client.view().rows[0].deletable);
    }

    #[test]
    fn test_delete_requires_admin() {
        let mut client = BoardClient::new();
        client.delete_entry(&EntryKey::from("k1"));
        assert!(!client.has_outgoing());

        client.login(ADMIN_PASSWORD, 1_000);
        client.delete_entry(&EntryKey::from("k1"));
        let out = client.take_outgoing();
        assert!(matches!(&out[..], [ClientMessage::Remove { key }] if key.as_str() == "k1"));
    }

    #[test]
    fn test_duplicate_submit_while_pending_is_dropped() {
        let mut client = synced_client();
        client.set_input("h");
        client.submit(100_000);
        client.take_outgoing();

        client.set_input("i");
        client.submit(100_010);
        assert!(!client.has_outgoing());
    }

    #[test]
    fn test_submit_before_initial_sync_is_dropped() {
        let mut client = BoardClient::new();
        assert!(!client.is_synced());
        client.set_input("h");
        client.submit(100_000);
        assert!(!client.has_outgoing());
        assert!(client.take_notice().is_none());
        assert_eq!(client.input(), "h");

        // The first timestamp delivery opens submissions.
        client.handle_event(SyncEvent::LastSubmission(0));
        assert!(client.is_synced());
        client.submit(100_000);
        assert_eq!(client.take_outgoing().len(), 1);
    }

    #[test]
    fn test_transport_failure_surfaces_and_releases_pending() {
        let mut client = synced_client();
        client.set_input("h");
        client.submit(100_000);
        // The push leaves the queue but never reaches the server.
        client.take_outgoing();

        client.handle_event(SyncEvent::Error {
            message: "send failed".to_string(),
        });
        assert_eq!(client.take_notice().as_deref(), Some(NOTICE_WRITE_FAILED));
        assert_eq!(client.input(), "h");

        // Not locked out: the next submission goes through.
        client.set_input("i");
        client.submit(10_000_000);
        assert_eq!(client.take_outgoing().len(), 1);
    }

    #[test]
    fn test_foreign_timestamp_does_not_complete_submission() {
        let mut client = synced_client();
        client.set_input("h");
        client.submit(100_000);
        client.take_outgoing();
        client.handle_event(SyncEvent::Pushed {
            key: EntryKey::from("k1"),
        });
        client.take_outgoing();

        // A racing overwrite from another client arrives first.
        client.handle_event(SyncEvent::LastSubmission(99_000));
        assert_eq!(client.input(), "h");
        assert_eq!(client.last_submission_ms(), 99_000);

        // Only the echo of our own value completes the submission.
        client.handle_event(SyncEvent::LastSubmission(100_000));
        assert_eq!(client.input(), "");
    }

    #[test]
    fn test_failure_after_foreign_timestamp_is_still_a_write_failure() {
        let mut client = synced_client();
        client.set_input("h");
        client.submit(100_000);
        client.take_outgoing();
        client.handle_event(SyncEvent::Pushed {
            key: EntryKey::from("k1"),
        });
        client.take_outgoing();

        client.handle_event(SyncEvent::LastSubmission(99_000));
        client.handle_event(SyncEvent::Error {
            message: "permission denied".to_string(),
        });
        assert_eq!(client.take_notice().as_deref(), Some(NOTICE_WRITE_FAILED));
    }
}
