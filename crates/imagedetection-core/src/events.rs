use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::PanelCommand;

/// Every UI-visible outcome of the session controller is an Event.
/// The presentation layer consumes them in order; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Status panel text/visibility update.
    PanelChanged {
        text: String,
        visible: bool,
        animated: bool,
        at: DateTime<Utc>,
    },
    /// Background blur shown while the session is interrupted or failed.
    BlurChanged {
        visible: bool,
        at: DateTime<Utc>,
    },
    /// Blocking alert offering to restart the session.
    AlertPresented {
        title: String,
        message: String,
        action_label: String,
        at: DateTime<Utc>,
    },
    /// Tracking session was re-run from scratch.
    SessionReset {
        detection_images: usize,
        at: DateTime<Utc>,
    },
    /// Restart was requested while a previous restart was cooling down.
    RestartIgnored {
        at: DateTime<Utc>,
    },
    /// Restart cooldown elapsed.
    RestartAvailable {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn panel(command: PanelCommand) -> Self {
        Event::PanelChanged {
            text: command.text,
            visible: command.visible,
            animated: command.animated,
            at: Utc::now(),
        }
    }

    /// The panel command carried by a `PanelChanged` event.
    pub fn as_panel_command(&self) -> Option<PanelCommand> {
        match self {
            Event::PanelChanged {
                text,
                visible,
                animated,
                ..
            } => Some(PanelCommand {
                text: text.clone(),
                visible: *visible,
                animated: *animated,
            }),
            _ => None,
        }
    }
}
