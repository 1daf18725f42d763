//! Tracking feedback and restart scenarios driven through the controller.

mod common;

use common::{controller, panel_commands, secs, shown_texts, CountingSession};
use imagedetection_core::{Event, LimitedReason, MessageCategory, PanelCommand, SessionEvent, TrackingState};
use std::time::Instant;

fn tracking(state: TrackingState) -> SessionEvent {
    SessionEvent::TrackingStateChanged { state }
}

#[test]
fn brief_motion_blip_never_escalates() {
    let t0 = Instant::now();
    let mut ctl = controller(CountingSession::default());
    let mut events = Vec::new();

    events.extend(ctl.handle_event(tracking(TrackingState::Normal), t0).unwrap());
    events.extend(
        ctl.handle_event(
            tracking(TrackingState::Limited(LimitedReason::ExcessiveMotion)),
            t0 + secs(1.0),
        )
        .unwrap(),
    );
    assert_eq!(
        shown_texts(&events).last().map(String::as_str),
        Some("Tracking limited\nExcessive motion")
    );
    assert!(ctl
        .scheduler()
        .has_pending(MessageCategory::TrackingStateEscalation));

    events.extend(ctl.handle_event(tracking(TrackingState::Normal), t0 + secs(2.0)).unwrap());
    assert!(!ctl
        .scheduler()
        .has_pending(MessageCategory::TrackingStateEscalation));

    events.extend(ctl.advance(t0 + secs(120.0)));
    assert_eq!(
        shown_texts(&events),
        vec![
            "Tracking normal",
            "Tracking limited\nExcessive motion",
            "Tracking normal",
        ]
    );
}

#[test]
fn persistent_low_detail_escalates_exactly_once() {
    let t0 = Instant::now();
    let mut ctl = controller(CountingSession::default());
    let state = TrackingState::Limited(LimitedReason::InsufficientFeatures);

    let first = ctl.handle_event(tracking(state), t0).unwrap();
    assert_eq!(shown_texts(&first), vec!["Tracking limited\nLow detail"]);

    assert!(ctl.advance(t0 + secs(2.9)).is_empty());

    let fired = ctl.advance(t0 + secs(3.0));
    let expected = "Tracking limited\nLow detail: Try pointing at a flat surface, or reset the session.";
    assert_eq!(panel_commands(&fired), vec![PanelCommand::show(expected)]);
    // Escalated messages auto-hide like any other.
    assert_eq!(ctl.scheduler().display().hide_at(), Some(t0 + secs(9.0)));

    let later = ctl.advance(t0 + secs(60.0));
    assert_eq!(panel_commands(&later), vec![PanelCommand::hide(expected, true)]);
}

#[test]
fn new_degraded_state_restarts_the_escalation_clock() {
    let t0 = Instant::now();
    let mut ctl = controller(CountingSession::default());

    ctl.handle_event(tracking(TrackingState::Limited(LimitedReason::Initializing)), t0)
        .unwrap();
    ctl.handle_event(
        tracking(TrackingState::Limited(LimitedReason::ExcessiveMotion)),
        t0 + secs(2.0),
    )
    .unwrap();

    assert!(shown_texts(&ctl.advance(t0 + secs(4.0))).is_empty());
    assert_eq!(
        shown_texts(&ctl.advance(t0 + secs(5.0))),
        vec!["Tracking limited\nExcessive motion: Try slowing down your movement, or reset the session."]
    );
}

#[test]
fn restart_is_debounced_until_cooldown_passes() {
    let t0 = Instant::now();
    let session = CountingSession::default();
    let mut ctl = controller(session.clone());

    let first = ctl.request_restart(t0).unwrap();
    assert!(matches!(first[..], [Event::SessionReset { .. }]));
    assert_eq!(session.runs(), 1);
    assert!(!ctl.is_restart_available());

    let ignored = ctl.request_restart(t0 + secs(1.0)).unwrap();
    assert!(matches!(ignored[..], [Event::RestartIgnored { .. }]));
    assert_eq!(session.runs(), 1);

    let reopened = ctl.advance(t0 + secs(5.0));
    assert!(reopened
        .iter()
        .any(|event| matches!(event, Event::RestartAvailable { .. })));
    assert!(ctl.is_restart_available());

    let second = ctl.request_restart(t0 + secs(5.0)).unwrap();
    assert!(matches!(second[..], [Event::SessionReset { .. }]));
    assert_eq!(session.runs(), 2);
}

#[test]
fn restart_drops_stale_guidance() {
    let t0 = Instant::now();
    let mut ctl = controller(CountingSession::default());
    ctl.start(t0).unwrap();
    ctl.handle_event(tracking(TrackingState::NotAvailable), t0 + secs(1.0))
        .unwrap();

    ctl.request_restart(t0 + secs(2.0)).unwrap();
    let events = ctl.advance(t0 + secs(8.0));

    // The first content hint (due at 7.5) and the escalation (due at 4) are gone.
    assert!(shown_texts(&events).is_empty());
    assert_eq!(
        shown_texts(&ctl.advance(t0 + secs(9.5))),
        vec!["Look around to detect images"]
    );
}
