//! Client-local admin session.

/// Embedded admin password, compared in plaintext on the client.
pub const ADMIN_PASSWORD: &str = "charboard-admin";

/// Elevated-privilege state for the current process only.
///
/// Never transmitted to the store and never persisted; a restart starts
/// over unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession {
    login_time_ms: u64,
}

impl AdminSession {
    /// Attempt a login. A wrong password simply fails; there is no
    /// lockout or retry backoff.
    pub fn login(password: &str, now_ms: u64) -> Option<Self> {
        (password == ADMIN_PASSWORD).then_some(Self {
            login_time_ms: now_ms,
        })
    }

    pub fn login_time_ms(&self) -> u64 {
        self.login_time_ms
    }

    /// Whether an entry was submitted after this session began.
    pub fn is_recent(&self, submitted_at_ms: u64) -> bool {
        submitted_at_ms > self.login_time_ms
    }
}
