//! Scripted session replay.
//!
//! Runs the session controller on a virtual clock so a whole tracking
//! session can be checked from the shell without waiting in real time:
//!
//! ```toml
//! [[step]]
//! at = 0.5
//! event = "tracking:excessive-motion"
//!
//! [[step]]
//! at = 2.0
//! event = "failed"
//! description = "Camera unavailable"
//! ```
//!
//! Each emitted event is printed as one JSON line with its offset. Panel
//! changes also carry the fade the status panel would run for them
//! (`status.fade_duration_secs`).

use clap::Args;
use imagedetection_core::session::RunOptions;
use imagedetection_core::{
    Config, Event, PanelView, ReferenceImageSet, SessionController, SessionError, SessionEvent,
    SessionFailure, StaticCatalog, TrackingSession, TrackingState,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Args)]
pub struct SimulateArgs {
    /// TOML script of timed session events
    script: PathBuf,
    /// Keep the clock running this many seconds after the last step
    #[arg(long, default_value_t = 30.0)]
    tail: f64,
    /// Read config from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default, rename = "step")]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    at: f64,
    event: String,
    #[serde(flatten)]
    failure: SessionFailure,
}

#[derive(Debug)]
enum Action {
    Session(SessionEvent),
    Restart,
    AcceptAlert,
    Pause,
}

impl Step {
    fn action(&self) -> Result<Action, String> {
        let action = match self.event.as_str() {
            "failed" => Action::Session(SessionEvent::Failed {
                failure: self.failure.clone(),
            }),
            "interrupted" => Action::Session(SessionEvent::Interrupted),
            "interruption-ended" => Action::Session(SessionEvent::InterruptionEnded),
            "restart" => Action::Restart,
            "accept-alert" => Action::AcceptAlert,
            "pause" => Action::Pause,
            other => match other.strip_prefix("tracking:") {
                Some(state) => Action::Session(SessionEvent::TrackingStateChanged {
                    state: state.parse::<TrackingState>()?,
                }),
                None => return Err(format!("unknown script event: {other}")),
            },
        };
        Ok(action)
    }

    fn offset(&self) -> Result<Duration, String> {
        Duration::try_from_secs_f64(self.at).map_err(|_| format!("invalid step time: {}", self.at))
    }
}

/// Tracking session that only logs what it is asked to do.
struct ScriptedSession;

impl TrackingSession for ScriptedSession {
    fn run(&mut self, detection_images: &ReferenceImageSet, _: RunOptions) -> Result<(), SessionError> {
        info!(images = detection_images.len(), "session run");
        Ok(())
    }

    fn pause(&mut self) {
        info!("session paused");
    }
}

#[derive(Serialize)]
struct Line<'a> {
    offset_secs: f64,
    event: &'a Event,
    /// Fade applied by the panel, absent for instant or non-panel changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    fade_secs: Option<f64>,
}

/// Event printer that also drives an in-memory status panel.
struct Printer {
    base: Instant,
    panel: PanelView,
}

impl Printer {
    fn line<'a>(&mut self, at: Instant, event: &'a Event) -> Line<'a> {
        let fade_secs = event.as_panel_command().and_then(|command| {
            self.panel.apply(&command);
            self.panel.transition().map(|fade| fade.as_secs_f64())
        });
        Line {
            offset_secs: (at - self.base).as_secs_f64(),
            event,
            fade_secs,
        }
    }

    fn print(&mut self, at: Instant, events: &[Event]) -> Result<(), serde_json::Error> {
        for event in events {
            let line = self.line(at, event);
            println!("{}", serde_json::to_string(&line)?);
        }
        Ok(())
    }
}

type Controller = SessionController<ScriptedSession, StaticCatalog>;

/// Fire timers one deadline at a time up to `until`, so each line carries
/// the instant it fired at.
fn run_clock(
    controller: &mut Controller,
    printer: &mut Printer,
    until: Instant,
) -> Result<(), serde_json::Error> {
    while let Some(deadline) = controller.next_deadline().filter(|d| *d <= until) {
        let events = controller.advance(deadline);
        printer.print(deadline, &events)?;
    }
    Ok(())
}

fn offset_from(base: Instant, offset: Duration) -> Result<Instant, String> {
    base.checked_add(offset)
        .ok_or_else(|| format!("offset of {}s is out of range", offset.as_secs_f64()))
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let content = std::fs::read_to_string(&args.script)?;
    let mut script: Script = toml::from_str(&content)?;
    script.steps.sort_by(|a, b| a.at.total_cmp(&b.at));
    let tail = Duration::try_from_secs_f64(args.tail).map_err(|_| "invalid --tail")?;

    let mut controller = SessionController::new(
        config.controller_config(),
        ScriptedSession,
        StaticCatalog::from_config(&config),
    );

    let base = Instant::now();
    let mut printer = Printer {
        base,
        panel: PanelView::new(config.fade_duration()),
    };
    printer.print(base, &controller.start(base)?)?;

    let mut last = base;
    for step in &script.steps {
        let at = offset_from(base, step.offset()?)?;
        run_clock(&mut controller, &mut printer, at)?;

        let events = match step.action()? {
            Action::Session(event) => controller.handle_event(event, at)?,
            Action::Restart => controller.request_restart(at)?,
            Action::AcceptAlert => controller.accept_alert(at)?,
            Action::Pause => {
                controller.pause();
                Vec::new()
            }
        };
        printer.print(at, &events)?;
        last = at;
    }

    run_clock(&mut controller, &mut printer, offset_from(last, tail)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(event: &str) -> Step {
        Step {
            at: 0.0,
            event: event.into(),
            failure: SessionFailure::default(),
        }
    }

    #[test]
    fn parses_tracking_events() {
        match step("tracking:relocalizing").action().unwrap() {
            Action::Session(SessionEvent::TrackingStateChanged { state }) => {
                assert_eq!(state.to_string(), "relocalizing");
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(step("tracking:upside-down").action().is_err());
        assert!(step("explode").action().is_err());
    }

    #[test]
    fn failure_fields_flatten_into_step() {
        let script: Script = toml::from_str(
            r#"
            [[step]]
            at = 2.0
            event = "failed"
            description = "Camera unavailable"
            recovery_suggestion = "Check permissions"
            "#,
        )
        .unwrap();
        match script.steps[0].action().unwrap() {
            Action::Session(SessionEvent::Failed { failure }) => {
                assert_eq!(failure.message(), "Camera unavailable\nCheck permissions");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn negative_offsets_are_rejected() {
        let mut bad = step("restart");
        bad.at = -1.0;
        assert!(bad.offset().is_err());
    }

    #[test]
    fn unrepresentable_offsets_are_errors() {
        let base = Instant::now();
        let mut far = step("restart");
        far.at = 1e19;
        assert!(offset_from(base, far.offset().unwrap()).is_err());
        assert!(offset_from(base, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn panel_lines_carry_configured_fade() {
        use imagedetection_core::PanelCommand;

        let base = Instant::now();
        let mut printer = Printer {
            base,
            panel: PanelView::new(Duration::from_millis(500)),
        };
        let show = Event::panel(PanelCommand::show("Tracking normal"));
        let instant_hide = Event::panel(PanelCommand::hide("Tracking normal", false));
        let reset = Event::RestartIgnored { at: chrono::Utc::now() };

        let line = printer.line(base + Duration::from_secs(2), &show);
        assert_eq!(line.offset_secs, 2.0);
        assert_eq!(line.fade_secs, Some(0.5));
        assert_eq!(printer.line(base, &instant_hide).fade_secs, None);
        assert_eq!(printer.line(base, &reset).fade_secs, None);
    }
}
