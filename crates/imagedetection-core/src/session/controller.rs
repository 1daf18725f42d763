//! Session controller.
//!
//! Owns the message scheduler and the restart gate, and turns tracking
//! session callbacks into UI events. Like the scheduler it is driven
//! entirely by the caller's `now`; the async [`StatusService`] wraps it in a
//! single owner task.
//!
//! ## Tracking feedback
//!
//! ```text
//! any change   -> show short status (auto-hide)
//! degraded     -> escalate after `escalation_delay` unless cancelled
//! normal       -> cancel pending escalation
//! ```
//!
//! [`StatusService`]: crate::runtime::StatusService

use indoc::indoc;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::catalog::{default_group, ReferenceImageCatalog, ReferenceImageSet};
use super::restart::{RestartGate, DEFAULT_RESTART_COOLDOWN};
use crate::error::SessionError;
use crate::events::Event;
use crate::status::{MessageCategory, MessageScheduler, PanelCommand, SchedulerConfig};
use crate::tracking::TrackingState;

pub const DEFAULT_ESCALATION_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_CONTENT_HINT_DELAY: Duration = Duration::from_millis(7500);

pub const CONTENT_HINT_MESSAGE: &str = "Look around to detect images";
pub const INTERRUPTED_MESSAGE: &str = indoc! {"
    SESSION INTERRUPTED
    The session will be reset after the interruption has ended."};
pub const RESETTING_MESSAGE: &str = "RESETTING SESSION";
pub const FAILURE_ALERT_TITLE: &str = "The AR session failed.";
pub const FAILURE_ALERT_ACTION: &str = "Restart Session";

/// Options passed to the tracking session on every (re)start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub reset_tracking: bool,
    pub remove_existing_anchors: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reset_tracking: true,
            remove_existing_anchors: true,
        }
    }
}

/// The camera tracking session (external).
pub trait TrackingSession {
    fn run(
        &mut self,
        detection_images: &ReferenceImageSet,
        options: RunOptions,
    ) -> Result<(), SessionError>;

    fn pause(&mut self);
}

/// Human-readable failure description delivered by the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFailure {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub recovery_suggestion: Option<String>,
}

impl SessionFailure {
    /// Present parts, one per line.
    pub fn message(&self) -> String {
        [&self.description, &self.reason, &self.recovery_suggestion]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Callbacks from the tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    TrackingStateChanged { state: TrackingState },
    Failed { failure: SessionFailure },
    Interrupted,
    InterruptionEnded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub scheduler: SchedulerConfig,
    pub escalation_delay: Duration,
    pub restart_cooldown: Duration,
    pub content_hint_delay: Duration,
    pub detection_group: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            escalation_delay: DEFAULT_ESCALATION_DELAY,
            restart_cooldown: DEFAULT_RESTART_COOLDOWN,
            content_hint_delay: DEFAULT_CONTENT_HINT_DELAY,
            detection_group: default_group(),
        }
    }
}

pub struct SessionController<S, C> {
    config: ControllerConfig,
    session: S,
    catalog: C,
    scheduler: MessageScheduler,
    restart: RestartGate,
    blurred: bool,
    detection_images: ReferenceImageSet,
}

impl<S: TrackingSession, C: ReferenceImageCatalog> SessionController<S, C> {
    pub fn new(config: ControllerConfig, session: S, catalog: C) -> Self {
        Self {
            scheduler: MessageScheduler::new(config.scheduler),
            restart: RestartGate::new(config.restart_cooldown),
            config,
            session,
            catalog,
            blurred: false,
            detection_images: ReferenceImageSet::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &MessageScheduler {
        &self.scheduler
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Images the session was last run with.
    pub fn detection_images(&self) -> &ReferenceImageSet {
        &self.detection_images
    }

    pub fn is_restart_available(&self) -> bool {
        self.restart.is_available()
    }

    pub fn is_blurred(&self) -> bool {
        self.blurred
    }

    pub fn should_attempt_relocalization(&self) -> bool {
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler
            .next_deadline()
            .into_iter()
            .chain(self.restart.next_deadline())
            .min()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin the experience.
    pub fn start(&mut self, now: Instant) -> Result<Vec<Event>, SessionError> {
        Ok(vec![self.reset_tracking(now)?])
    }

    /// Re-run the session with the configured detection images.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingReferenceImages`] when the detection
    /// group is absent, which the owner must treat as fatal.
    pub fn reset_tracking(&mut self, now: Instant) -> Result<Event, SessionError> {
        let group = &self.config.detection_group;
        let images = self.catalog.reference_images(group).ok_or_else(|| {
            SessionError::MissingReferenceImages {
                group: group.clone(),
            }
        })?;

        self.session.run(&images, RunOptions::default())?;
        info!(images = images.len(), "tracking session reset");

        self.scheduler.schedule_message(
            CONTENT_HINT_MESSAGE,
            self.config.content_hint_delay,
            MessageCategory::ContentPlacement,
            now,
        );

        let detection_images = images.len();
        self.detection_images = images;
        Ok(Event::SessionReset {
            detection_images,
            at: chrono::Utc::now(),
        })
    }

    pub fn handle_event(
        &mut self,
        event: SessionEvent,
        now: Instant,
    ) -> Result<Vec<Event>, SessionError> {
        match event {
            SessionEvent::TrackingStateChanged { state } => {
                Ok(vec![self.handle_tracking_state(state, now)])
            }
            SessionEvent::Failed { failure } => {
                warn!(message = %failure.message(), "tracking session failed");
                Ok(vec![
                    self.set_blur(true),
                    Event::AlertPresented {
                        title: FAILURE_ALERT_TITLE.into(),
                        message: failure.message(),
                        action_label: FAILURE_ALERT_ACTION.into(),
                        at: chrono::Utc::now(),
                    },
                ])
            }
            SessionEvent::Interrupted => Ok(vec![
                self.set_blur(true),
                Event::panel(self.scheduler.show_message(INTERRUPTED_MESSAGE, false, now)),
            ]),
            SessionEvent::InterruptionEnded => {
                let mut events = vec![
                    self.set_blur(false),
                    Event::panel(self.scheduler.show_message(RESETTING_MESSAGE, true, now)),
                ];
                events.extend(self.request_restart(now)?);
                Ok(events)
            }
        }
    }

    /// Show the short status and start or cancel the escalation.
    pub fn handle_tracking_state(&mut self, state: TrackingState, now: Instant) -> Event {
        let command = self.show_tracking_quality_info(state, true, now);

        if state.is_degraded() {
            self.scheduler.escalate_tracking_feedback(
                state.presentation_string(),
                state.recommendation().map(str::to_owned),
                self.config.escalation_delay,
                now,
            );
        } else {
            self.scheduler
                .cancel_scheduled_message(MessageCategory::TrackingStateEscalation);
        }

        Event::panel(command)
    }

    pub fn show_tracking_quality_info(
        &mut self,
        state: TrackingState,
        auto_hide: bool,
        now: Instant,
    ) -> PanelCommand {
        self.scheduler
            .show_message(state.presentation_string(), auto_hide, now)
    }

    /// User pressed restart. Ignored while the previous restart cools down.
    pub fn request_restart(&mut self, now: Instant) -> Result<Vec<Event>, SessionError> {
        if !self.restart.try_begin(now) {
            warn!("restart ignored, previous restart still settling");
            return Ok(vec![Event::RestartIgnored {
                at: chrono::Utc::now(),
            }]);
        }

        self.scheduler.cancel_all_scheduled_messages();
        Ok(vec![self.reset_tracking(now)?])
    }

    /// User accepted the failure alert.
    pub fn accept_alert(&mut self, now: Instant) -> Result<Vec<Event>, SessionError> {
        let blur = self.set_blur(false);
        Ok(vec![blur, self.reset_tracking(now)?])
    }

    /// View is going away.
    pub fn pause(&mut self) {
        self.session.pause();
    }

    /// Fire everything due at or before `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .scheduler
            .advance(now)
            .into_iter()
            .map(Event::panel)
            .collect();

        if self.restart.advance(now) {
            events.push(Event::RestartAvailable {
                at: chrono::Utc::now(),
            });
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_blur(&mut self, visible: bool) -> Event {
        self.blurred = visible;
        Event::BlurChanged {
            visible,
            at: chrono::Utc::now(),
        }
    }
}
