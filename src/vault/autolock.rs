//! Idle auto-lock timer.
//!
//! Tracks the last user action in an unlocked session and reports when
//! the idle window has run out. The session checks this on entry to
//! every operation and drops its decrypted state when the deadline has
//! passed. Callers supply the clock as epoch milliseconds.

/// Default idle window before the session locks itself.
pub const DEFAULT_AUTO_LOCK_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy)]
pub struct AutoLock {
    timeout_ms: i64,
    last_activity_ms: i64,
}

impl AutoLock {
    pub fn new(timeout_minutes: i64, now_ms: i64) -> Self {
        Self {
            timeout_ms: timeout_minutes * 60_000,
            last_activity_ms: now_ms,
        }
    }

    /// Record user activity, pushing the deadline out.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_activity_ms = now_ms;
    }

    /// Whether the idle window has fully elapsed.
    pub fn expired(&self, now_ms: i64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    /// Milliseconds until auto-lock, clamped at zero.
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        let elapsed = now_ms - self.last_activity_ms;
        (self.timeout_ms - elapsed).max(0)
    }
}
