//! Status message scheduler.
//!
//! The scheduler is a monotonic-clock state machine. Like the rest of the
//! core it owns no thread: every operation takes the caller's `now`, and the
//! caller is responsible for calling [`MessageScheduler::advance`] once the
//! instant returned by [`MessageScheduler::next_deadline`] has passed.
//!
//! ## Timers
//!
//! ```text
//! category slots : [ContentPlacement] [TrackingStateEscalation]   at most one each
//! auto-hide      : one, for the currently displayed message
//! ```
//!
//! Scheduling into an occupied slot cancels the old timer first, so two
//! schedules in a row only ever show the second message. Showing a message
//! drops the old auto-hide timer before arming a new one, so a stale hide
//! can never hide a newer message.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::panel::PanelCommand;
use crate::timer::{OneShot, TimerIds};

/// How long an auto-hiding message stays visible.
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_secs(6);

/// Independently schedulable message slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    TrackingStateEscalation,
    ContentPlacement,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 2] = [
        MessageCategory::ContentPlacement,
        MessageCategory::TrackingStateEscalation,
    ];

    const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        match self {
            MessageCategory::TrackingStateEscalation => 0,
            MessageCategory::ContentPlacement => 1,
        }
    }
}

/// What a pending timer does when it fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Show a fixed message.
    Show { text: String },
    /// Show a tracking status, optionally followed by a recovery hint.
    Escalate {
        state_description: String,
        recommendation: Option<String>,
    },
}

impl PendingAction {
    /// Text shown when the timer fires.
    pub fn message(&self) -> String {
        match self {
            PendingAction::Show { text } => text.clone(),
            PendingAction::Escalate {
                state_description,
                recommendation: Some(recommendation),
            } => format!("{state_description}: {recommendation}"),
            PendingAction::Escalate {
                state_description,
                recommendation: None,
            } => state_description.clone(),
        }
    }
}

/// A delayed message waiting in a category slot.
#[derive(Debug, Clone)]
pub struct PendingTimer {
    category: MessageCategory,
    timer: OneShot<PendingAction>,
}

impl PendingTimer {
    pub fn category(&self) -> MessageCategory {
        self.category
    }

    pub fn scheduled_at(&self) -> Instant {
        self.timer.scheduled_at()
    }

    pub fn fire_at(&self) -> Instant {
        self.timer.fire_at()
    }

    pub fn action(&self) -> &PendingAction {
        self.timer.action()
    }
}

/// The message currently on screen.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    text: String,
    visible: bool,
    hide_timer: Option<OneShot<()>>,
}

impl DisplayState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// When the current message will auto-hide, if it will.
    pub fn hide_at(&self) -> Option<Instant> {
        self.hide_timer.as_ref().map(OneShot::fire_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub display_duration: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            display_duration: DEFAULT_DISPLAY_DURATION,
        }
    }
}

/// Next timer to fire inside [`MessageScheduler::advance`].
enum Due {
    Slot(usize),
    Hide,
}

/// Owns the displayed message and every pending message timer.
#[derive(Debug, Clone)]
pub struct MessageScheduler {
    config: SchedulerConfig,
    display: DisplayState,
    slots: [Option<PendingTimer>; MessageCategory::COUNT],
    ids: TimerIds,
}

impl Default for MessageScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl MessageScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            display: DisplayState::default(),
            slots: Default::default(),
            ids: TimerIds::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn pending(&self, category: MessageCategory) -> Option<&PendingTimer> {
        self.slots[category.index()].as_ref()
    }

    pub fn has_pending(&self, category: MessageCategory) -> bool {
        self.pending(category).is_some()
    }

    /// Earliest instant at which [`advance`](Self::advance) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots
            .iter()
            .flatten()
            .map(PendingTimer::fire_at)
            .chain(self.display.hide_at())
            .min()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Show `text` now, replacing whatever is on screen.
    pub fn show_message(
        &mut self,
        text: impl Into<String>,
        auto_hide: bool,
        now: Instant,
    ) -> PanelCommand {
        self.display.hide_timer = None;
        self.display.text = text.into();
        self.display.visible = true;

        if auto_hide {
            let timer = OneShot::new(self.ids.next(), now, self.config.display_duration, ());
            self.display.hide_timer = Some(timer);
        }

        debug!(text = %self.display.text, auto_hide, "showing status message");
        PanelCommand::show(self.display.text.clone())
    }

    /// Hide the current message and drop its auto-hide timer.
    pub fn hide_message(&mut self, animated: bool) -> PanelCommand {
        self.display.hide_timer = None;
        self.display.visible = false;
        PanelCommand::hide(self.display.text.clone(), animated)
    }

    /// Show `text` after `delay`, superseding anything pending in `category`.
    pub fn schedule_message(
        &mut self,
        text: impl Into<String>,
        delay: Duration,
        category: MessageCategory,
        now: Instant,
    ) {
        let action = PendingAction::Show { text: text.into() };
        self.arm(category, action, delay, now);
    }

    /// Drop the pending timer for `category`. Returns whether one existed.
    pub fn cancel_scheduled_message(&mut self, category: MessageCategory) -> bool {
        let cancelled = self.slots[category.index()].take().is_some();
        if cancelled {
            debug!(?category, "cancelled scheduled message");
        }
        cancelled
    }

    /// Cancel every category. Returns how many timers were dropped.
    pub fn cancel_all_scheduled_messages(&mut self) -> usize {
        MessageCategory::ALL
            .into_iter()
            .filter(|&category| self.cancel_scheduled_message(category))
            .count()
    }

    /// Show a tracking status (plus recovery hint) only if nothing cancels
    /// the escalation slot within `delay`.
    pub fn escalate_tracking_feedback(
        &mut self,
        state_description: impl Into<String>,
        recommendation: Option<String>,
        delay: Duration,
        now: Instant,
    ) {
        let action = PendingAction::Escalate {
            state_description: state_description.into(),
            recommendation,
        };
        self.arm(MessageCategory::TrackingStateEscalation, action, delay, now);
    }

    /// Fire every timer due at or before `now`, earliest first.
    ///
    /// A timer fires as of its own deadline, so a message shown by a timer
    /// due at `d` auto-hides at `d + display_duration` no matter how late
    /// `advance` is called.
    pub fn advance(&mut self, now: Instant) -> Vec<PanelCommand> {
        let mut commands = Vec::new();

        while let Some(due) = self.next_due(now) {
            match due {
                Due::Slot(index) => {
                    let Some(pending) = self.slots[index].take() else {
                        break;
                    };
                    let fired_at = pending.fire_at();
                    debug!(category = ?pending.category, "scheduled message fired");
                    let message = pending.timer.into_action().message();
                    commands.push(self.show_message(message, true, fired_at));
                }
                Due::Hide => {
                    debug!(text = %self.display.text, "auto-hiding status message");
                    commands.push(self.hide_message(true));
                }
            }
        }

        commands
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(
        &mut self,
        category: MessageCategory,
        action: PendingAction,
        delay: Duration,
        now: Instant,
    ) {
        self.cancel_scheduled_message(category);
        let timer = OneShot::new(self.ids.next(), now, delay, action);
        debug!(?category, delay_ms = delay.as_millis() as u64, "scheduled message");
        self.slots[category.index()] = Some(PendingTimer { category, timer });
    }

    fn next_due(&self, now: Instant) -> Option<Due> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|p| (p.timer.order_key(), index)))
            .filter(|((fire_at, _), _)| *fire_at <= now)
            .min();
        let hide = self
            .display
            .hide_timer
            .as_ref()
            .filter(|timer| timer.is_due(now))
            .map(OneShot::order_key);

        match (slot, hide) {
            (Some((slot_key, index)), Some(hide_key)) if slot_key < hide_key => Some(Due::Slot(index)),
            (Some(_), Some(_)) | (None, Some(_)) => Some(Due::Hide),
            (Some((_, index)), None) => Some(Due::Slot(index)),
            (None, None) => None,
        }
    }
}
