//! Presentation commands for the status panel.
//!
//! [`PanelCommand`] is the only thing the status core ever tells the UI:
//! which text to show, whether the panel should be visible, and whether the
//! change should be animated. [`PanelView`] is an in-memory presenter that
//! applies those commands the way the message panel does (alpha 0 or 1, with
//! a fixed fade duration when animated).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default fade used when a visibility change is animated.
pub const DEFAULT_FADE: Duration = Duration::from_millis(200);

/// "Set message text to S, panel visible = v, animate = a".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelCommand {
    pub text: String,
    pub visible: bool,
    pub animated: bool,
}

impl PanelCommand {
    pub fn show(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            animated: true,
        }
    }

    pub fn hide(text: impl Into<String>, animated: bool) -> Self {
        Self {
            text: text.into(),
            visible: false,
            animated,
        }
    }
}

/// In-memory status panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    text: String,
    /// The panel starts hidden until the first command arrives.
    hidden: bool,
    alpha: f32,
    /// Duration of the last requested transition, `None` when it was instant.
    transition: Option<Duration>,
    fade: Duration,
}

impl Default for PanelView {
    fn default() -> Self {
        Self::new(DEFAULT_FADE)
    }
}

impl PanelView {
    pub fn new(fade: Duration) -> Self {
        Self {
            text: String::new(),
            hidden: true,
            alpha: 0.0,
            transition: None,
            fade,
        }
    }

    pub fn apply(&mut self, command: &PanelCommand) {
        self.text.clone_from(&command.text);
        // Un-hide before animating alpha, otherwise the fade is invisible.
        self.hidden = false;
        self.alpha = if command.visible { 1.0 } else { 0.0 };
        self.transition = command.animated.then_some(self.fade);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_shown(&self) -> bool {
        !self.hidden && self.alpha > 0.0
    }

    pub fn transition(&self) -> Option<Duration> {
        self.transition
    }
}
