mod panel;
mod scheduler;

pub use panel::{PanelCommand, PanelView, DEFAULT_FADE};
pub use scheduler::{
    DisplayState, MessageCategory, MessageScheduler, PendingAction, PendingTimer,
    SchedulerConfig, DEFAULT_DISPLAY_DURATION,
};
