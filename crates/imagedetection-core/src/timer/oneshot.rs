//! One-shot deadline timers.
//!
//! A [`OneShot`] is the delayed-callback primitive the status core is built
//! on. It carries no thread and no waker: it is a deadline plus the action to
//! run, and the owner decides when to fire it by comparing against a
//! monotonic `now`. The async runtime turns [`OneShot::fire_at`] into a
//! `tokio::time::sleep_until`.
//!
//! ```ignore
//! let mut ids = TimerIds::default();
//! let timer = OneShot::new(ids.next(), now, Duration::from_secs(3), action);
//! if timer.is_due(later) {
//!     run(timer.into_action());
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest delay a timer honours; longer delays are clamped to it.
/// Roughly 30 years, the same horizon tokio uses for "never".
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Identity of a scheduled timer, unique per owner and increasing in
/// scheduling order. Used to break ties between equal deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic [`TimerId`] source.
#[derive(Debug, Default, Clone)]
pub struct TimerIds {
    next: u64,
}

impl TimerIds {
    pub fn next(&mut self) -> TimerId {
        let id = TimerId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// A single outstanding delayed action.
#[derive(Debug, Clone)]
pub struct OneShot<A> {
    id: TimerId,
    scheduled_at: Instant,
    fire_at: Instant,
    action: A,
}

impl<A> OneShot<A> {
    /// Arm a timer that fires `delay` after `now`.
    ///
    /// Delays past [`FAR_FUTURE`] are clamped to it, so an unrepresentable
    /// deadline never turns into an immediate one.
    pub fn new(id: TimerId, now: Instant, delay: Duration, action: A) -> Self {
        let fire_at = now.checked_add(delay.min(FAR_FUTURE)).unwrap_or(now);
        Self {
            id,
            scheduled_at: now,
            fire_at,
            action,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn scheduled_at(&self) -> Instant {
        self.scheduled_at
    }

    pub fn fire_at(&self) -> Instant {
        self.fire_at
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// Ordering key: earliest deadline first, then scheduling order.
    pub fn order_key(&self) -> (Instant, TimerId) {
        (self.fire_at, self.id)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.fire_at <= now
    }

    /// Time left until the deadline, zero once due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.fire_at.saturating_duration_since(now)
    }

    pub fn into_action(self) -> A {
        self.action
    }
}
