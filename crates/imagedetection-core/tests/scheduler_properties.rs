//! Supersede and cancellation properties of the message scheduler.

use imagedetection_core::{MessageCategory, MessageScheduler, PanelCommand};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn category(index: usize) -> MessageCategory {
    MessageCategory::ALL[index % MessageCategory::ALL.len()]
}

fn shows(commands: &[PanelCommand]) -> Vec<&str> {
    commands
        .iter()
        .filter(|cmd| cmd.visible)
        .map(|cmd| cmd.text.as_str())
        .collect()
}

proptest! {
    #[test]
    fn rescheduling_a_category_shows_only_the_second_message(
        index in 0usize..2,
        first_delay_ms in 1u64..20_000,
        second_delay_ms in 0u64..20_000,
        gap_fraction in 0.0f64..1.0,
    ) {
        let t0 = Instant::now();
        let gap = Duration::from_millis(((first_delay_ms - 1) as f64 * gap_fraction) as u64);
        let mut scheduler = MessageScheduler::default();

        scheduler.schedule_message("first", Duration::from_millis(first_delay_ms), category(index), t0);
        scheduler.schedule_message("second", Duration::from_millis(second_delay_ms), category(index), t0 + gap);

        let commands = scheduler.advance(t0 + Duration::from_secs(60));
        prop_assert_eq!(shows(&commands), vec!["second"]);
    }

    #[test]
    fn repeated_escalation_fires_once_with_latest_parameters(
        first_delay_ms in 1u64..10_000,
        second_delay_ms in 0u64..10_000,
        gap_fraction in 0.0f64..1.0,
    ) {
        let t0 = Instant::now();
        let gap = Duration::from_millis(((first_delay_ms - 1) as f64 * gap_fraction) as u64);
        let mut scheduler = MessageScheduler::default();

        scheduler.escalate_tracking_feedback(
            "Tracking limited\nExcessive motion",
            Some("slow down".into()),
            Duration::from_millis(first_delay_ms),
            t0,
        );
        scheduler.escalate_tracking_feedback(
            "Tracking limited\nLow detail",
            Some("find a flat surface".into()),
            Duration::from_millis(second_delay_ms),
            t0 + gap,
        );

        let commands = scheduler.advance(t0 + Duration::from_secs(60));
        prop_assert_eq!(
            shows(&commands),
            vec!["Tracking limited\nLow detail: find a flat surface"]
        );
    }
}

#[test]
fn cancel_before_fire_prevents_show() {
    let t0 = Instant::now();
    for category in MessageCategory::ALL {
        let mut scheduler = MessageScheduler::default();
        scheduler.schedule_message("never", Duration::from_secs(2), category, t0);
        scheduler.cancel_scheduled_message(category);
        assert!(scheduler.advance(t0 + Duration::from_secs(60)).is_empty());
        assert_eq!(scheduler.display().text(), "");
    }
}

#[test]
fn cancel_all_clears_every_pending_category() {
    let t0 = Instant::now();
    let mut scheduler = MessageScheduler::default();
    scheduler.schedule_message("hint", Duration::from_secs(7), MessageCategory::ContentPlacement, t0);
    scheduler.escalate_tracking_feedback("Tracking unavailable", None, Duration::from_secs(3), t0);

    assert_eq!(scheduler.cancel_all_scheduled_messages(), 2);
    for category in MessageCategory::ALL {
        assert!(!scheduler.has_pending(category));
    }
    // Nothing left: second call is a no-op.
    assert_eq!(scheduler.cancel_all_scheduled_messages(), 0);
    assert!(scheduler.advance(t0 + Duration::from_secs(60)).is_empty());
}

#[test]
fn second_show_moves_the_single_hide() {
    let t0 = Instant::now();
    let second_at = t0 + Duration::from_secs(2);
    let mut scheduler = MessageScheduler::default();

    scheduler.show_message("Tracking normal", true, t0);
    scheduler.show_message("Initializing", true, second_at);

    // Nothing at the first message's deadline.
    assert!(scheduler.advance(t0 + Duration::from_secs(6)).is_empty());

    let commands = scheduler.advance(second_at + Duration::from_secs(6));
    assert_eq!(commands, vec![PanelCommand::hide("Initializing", true)]);

    // And never again.
    assert!(scheduler.advance(t0 + Duration::from_secs(600)).is_empty());
}
