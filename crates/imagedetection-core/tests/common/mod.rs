//! Shared fixtures for integration tests.

#![allow(dead_code)]

use imagedetection_core::session::RunOptions;
use imagedetection_core::{
    ControllerConfig, Event, PanelCommand, ReferenceImage, ReferenceImageSet, SessionController,
    SessionError, StaticCatalog, TrackingSession,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tracking session that only counts runs. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingSession {
    runs: Arc<AtomicUsize>,
}

impl CountingSession {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl TrackingSession for CountingSession {
    fn run(&mut self, _: &ReferenceImageSet, _: RunOptions) -> Result<(), SessionError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {}
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new(vec![
        ReferenceImage {
            name: "poster".into(),
            group: "AR Resources".into(),
            physical_width: 0.42,
            physical_height: 0.59,
        },
        ReferenceImage {
            name: "book-cover".into(),
            group: "AR Resources".into(),
            physical_width: 0.15,
            physical_height: 0.23,
        },
    ])
}

pub fn controller(session: CountingSession) -> SessionController<CountingSession, StaticCatalog> {
    SessionController::new(ControllerConfig::default(), session, catalog())
}

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

pub fn panel_commands(events: &[Event]) -> Vec<PanelCommand> {
    events.iter().filter_map(Event::as_panel_command).collect()
}

/// Texts of every "show" command, in order.
pub fn shown_texts(events: &[Event]) -> Vec<String> {
    panel_commands(events)
        .into_iter()
        .filter(|cmd| cmd.visible)
        .map(|cmd| cmd.text)
        .collect()
}
