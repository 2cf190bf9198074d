use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use exam_core::Clock;

/// Client-side gate in front of the question-bank editor.
///
/// Explicitly not a security boundary: it compares against a configured
/// password and remembers the grant for a bounded time, so a shared
/// machine does not keep the editor open forever. Real authorization
/// belongs to the backend.
pub struct AccessGate {
    password: String,
    ttl: Duration,
    clock: Clock,
    granted_at: Mutex<Option<DateTime<Utc>>>,
}

impl AccessGate {
    /// Default grant lifetime.
    pub const DEFAULT_TTL_MINUTES: i64 = 60;

    #[must_use]
    pub fn new(password: impl Into<String>, ttl: Duration, clock: Clock) -> Self {
        Self {
            password: password.into(),
            ttl,
            clock,
            granted_at: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_default_ttl(password: impl Into<String>, clock: Clock) -> Self {
        Self::new(
            password,
            Duration::minutes(Self::DEFAULT_TTL_MINUTES),
            clock,
        )
    }

    /// Checks the attempt; on a match the grant starts now.
    pub fn unlock(&self, attempt: &str) -> bool {
        if attempt != self.password {
            return false;
        }
        *self.granted_at.lock().expect("gate state") = Some(self.clock.now());
        true
    }

    /// Revokes the grant.
    pub fn lock(&self) {
        *self.granted_at.lock().expect("gate state") = None;
    }

    /// Whether a grant exists and has not outlived its TTL at `now`.
    #[must_use]
    pub fn is_unlocked_at(&self, now: DateTime<Utc>) -> bool {
        let granted = *self.granted_at.lock().expect("gate state");
        granted.is_some_and(|at| now.signed_duration_since(at) <= self.ttl)
    }

    /// Convenience form of [`Self::is_unlocked_at`] against the gate's
    /// own clock.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.is_unlocked_at(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::time::{fixed_clock, fixed_now};

    #[test]
    fn wrong_password_stays_locked() {
        let gate = AccessGate::with_default_ttl("hunter2", fixed_clock());
        assert!(!gate.unlock("wrong"));
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn unlock_then_lock() {
        let gate = AccessGate::with_default_ttl("hunter2", fixed_clock());
        assert!(gate.unlock("hunter2"));
        assert!(gate.is_unlocked());
        gate.lock();
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn grant_expires_after_ttl() {
        let gate = AccessGate::new("hunter2", Duration::minutes(10), fixed_clock());
        assert!(gate.unlock("hunter2"));
        assert!(gate.is_unlocked_at(fixed_now() + Duration::minutes(10)));
        assert!(!gate.is_unlocked_at(fixed_now() + Duration::minutes(11)));
    }
}
