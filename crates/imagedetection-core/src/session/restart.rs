//! Restart debouncing.
//!
//! A restart takes a moment to settle, so further restart requests are
//! ignored until `cooldown` has elapsed since the last accepted one.

use std::time::{Duration, Instant};

use crate::timer::{OneShot, TimerIds};

pub const DEFAULT_RESTART_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct RestartGate {
    cooldown: Duration,
    reopen: Option<OneShot<()>>,
    ids: TimerIds,
}

impl Default for RestartGate {
    fn default() -> Self {
        Self::new(DEFAULT_RESTART_COOLDOWN)
    }
}

impl RestartGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            reopen: None,
            ids: TimerIds::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.reopen.is_none()
    }

    /// Claim the gate. Returns `false` while a previous restart cools down.
    pub fn try_begin(&mut self, now: Instant) -> bool {
        if !self.is_available() {
            return false;
        }
        self.reopen = Some(OneShot::new(self.ids.next(), now, self.cooldown, ()));
        true
    }

    /// Reopen the gate once the cooldown has passed. Returns `true` on the
    /// transition back to available.
    pub fn advance(&mut self, now: Instant) -> bool {
        match &self.reopen {
            Some(timer) if timer.is_due(now) => {
                self.reopen = None;
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.reopen.as_ref().map(OneShot::fire_at)
    }
}
