use chrono::{DateTime, Utc};

/// Outcome of a single countdown recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTick {
    /// Whole seconds left, floored at zero.
    pub remaining_seconds: u32,
    /// True on exactly one tick: the first one observed at or past the
    /// deadline.
    pub just_expired: bool,
}

/// Derived countdown state against a server-issued deadline.
///
/// The countdown holds no timer of its own; the caller recomputes it once
/// per second with the current time. Only the server's `expires_at` is
/// trusted — the local clock contributes nothing but "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    expires_at: DateTime<Utc>,
    fired: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            fired: false,
        }
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whole remaining seconds at `now`, floored at zero.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u32 {
        let diff = self.expires_at.signed_duration_since(now).num_seconds();
        u32::try_from(diff.max(0)).unwrap_or(u32::MAX)
    }

    /// True once the expiry edge has been reported.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Recomputes the countdown at `now`.
    ///
    /// The expiry edge is reported on the first tick at or past the
    /// deadline and never again; after that the countdown is inert.
    pub fn tick(&mut self, now: DateTime<Utc>) -> CountdownTick {
        let remaining_seconds = self.remaining_seconds(now);
        let expired_now = now >= self.expires_at && !self.fired;
        if expired_now {
            self.fired = true;
        }
        CountdownTick {
            remaining_seconds,
            just_expired: expired_now,
        }
    }
}
