//! Failed-attempt counting and timed lockout.
//!
//! Pure transition functions over [`SecuritySettings`]; callers supply
//! the clock as epoch milliseconds. The session applies these both to
//! the settings persisted inside the document and to its own in-memory
//! ledger for attempts made before any decrypt succeeds.
//!
//! A lapsed lock (`lock_until` in the past) reports unlocked but leaves
//! `is_locked` set; only a successful unlock clears the counters. A
//! failure recorded after the lock lapsed therefore re-locks at once,
//! because the attempt count never went below the threshold.

use super::document::SecuritySettings;

/// Answer from [`check_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    pub locked: bool,
    /// Minutes until the lock lapses, rounded up. Zero when unlocked.
    pub remaining_minutes: i64,
}

impl LockStatus {
    fn unlocked() -> Self {
        Self {
            locked: false,
            remaining_minutes: 0,
        }
    }
}

/// Whether the vault is locked at `now_ms`, and for how much longer.
pub fn check_status(settings: &SecuritySettings, now_ms: i64) -> LockStatus {
    if settings.is_locked && settings.lock_until > now_ms {
        let remaining_ms = settings.lock_until - now_ms;
        return LockStatus {
            locked: true,
            remaining_minutes: (remaining_ms + 59_999) / 60_000,
        };
    }

    LockStatus::unlocked()
}

/// Record one failed unlock attempt.
///
/// Increments the counter; at `max_failed_attempts` the vault locks
/// until `now + lockout_duration_minutes`. Failures past the threshold
/// push `lock_until` further out.
///
/// Returns `true` only when this call transitioned the vault from
/// unlocked to locked; callers log a `soft_lock` event on that edge.
pub fn record_failure(settings: &mut SecuritySettings, now_ms: i64) -> bool {
    let was_locked = settings.is_locked;

    settings.failed_attempt_count += 1;
    settings.last_failed_attempt = now_ms;

    let should_lock = settings.failed_attempt_count >= settings.max_failed_attempts;
    settings.is_locked = should_lock;
    if should_lock {
        settings.lock_until = now_ms + settings.lockout_duration_minutes * 60_000;
    }

    !was_locked && settings.is_locked
}

/// Reset all counters after a successful unlock.
pub fn record_success(settings: &mut SecuritySettings) {
    settings.failed_attempt_count = 0;
    settings.last_failed_attempt = 0;
    settings.is_locked = false;
    settings.lock_until = 0;
}
