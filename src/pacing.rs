//! Self-throttling between upstream calls.
//!
//! Both the timetable provider and the calendar store are shared, rate-limited
//! services, so batches space their calls out instead of issuing them
//! back-to-back. The delay values live in [`PacingPolicy`] and the sleep
//! itself is injectable, so orchestrator tests run without waiting.

use std::thread;
use std::time::Duration;

/// Fixed delays applied between the different kinds of upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Between individual event upserts.
    pub between_upserts: Duration,
    /// Between per-day schedule fetches within a week.
    pub between_days: Duration,
    /// Between monthly schedule fetches within a yearly calendar request.
    pub between_month_fetches: Duration,
    /// Between the monthly batches of a yearly sync.
    pub between_months: Duration,
    /// Between principals in a fleet-wide auto-sync pass.
    pub between_users: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy {
            between_upserts: Duration::from_millis(100),
            between_days: Duration::from_millis(200),
            between_month_fetches: Duration::from_millis(500),
            between_months: Duration::from_secs(2),
            between_users: Duration::from_millis(500),
        }
    }
}

impl PacingPolicy {
    /// No delays at all. Used by tests.
    pub fn zero() -> Self {
        PacingPolicy {
            between_upserts: Duration::ZERO,
            between_days: Duration::ZERO,
            between_month_fetches: Duration::ZERO,
            between_months: Duration::ZERO,
            between_users: Duration::ZERO,
        }
    }
}

type SleepFn = Box<dyn Fn(Duration) + Send + Sync>;

/// Applies a [`PacingPolicy`] through an injectable sleep function.
pub struct Pacer {
    policy: PacingPolicy,
    sleep: SleepFn,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Pacer::with_sleeper(policy, Box::new(thread::sleep))
    }

    /// Substitute the sleep implementation (tests pass a recorder).
    pub fn with_sleeper(policy: PacingPolicy, sleep: SleepFn) -> Self {
        Pacer { policy, sleep }
    }

    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            (self.sleep)(duration);
        }
    }

    pub fn after_upsert(&self) {
        self.pause(self.policy.between_upserts);
    }

    pub fn between_days(&self) {
        self.pause(self.policy.between_days);
    }

    pub fn between_month_fetches(&self) {
        self.pause(self.policy.between_month_fetches);
    }

    pub fn between_months(&self) {
        self.pause(self.policy.between_months);
    }

    pub fn between_users(&self) {
        self.pause(self.policy.between_users);
    }
}
