//! Global cooldown evaluation.

/// Cooldown window between accepted submissions, shared by all clients.
pub const SUBMISSION_INTERVAL_MS: u64 = 60_000;

/// Result of evaluating the cooldown at a point in time.
///
/// Evaluation is pure: the shared last-submission time is only ever
/// updated by the timestamp subscription, never here. The UI re-evaluates
/// on a 1-second cadence and again immediately whenever the remote
/// timestamp changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// Submissions are open.
    Ready,
    /// Cooldown active; seconds remaining, rounded up.
    Waiting { seconds_left: u64 },
}

impl CooldownStatus {
    pub fn evaluate(last_submission_ms: u64, now_ms: u64) -> Self {
        let elapsed = now_ms.saturating_sub(last_submission_ms);
        if elapsed >= SUBMISSION_INTERVAL_MS {
            CooldownStatus::Ready
        } else {
            let left = SUBMISSION_INTERVAL_MS - elapsed;
            CooldownStatus::Waiting {
                seconds_left: left.div_ceil(1000),
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CooldownStatus::Ready)
    }

    /// User-facing status line.
    pub fn message(&self) -> String {
        match self {
            CooldownStatus::Ready => "✅ 입력 가능합니다!".to_string(),
            CooldownStatus::Waiting { seconds_left } => {
                format!("⏳ 다음 입력까지 {seconds_left}초 남았습니다...")
            }
        }
    }
}
