mod catalog;
mod controller;
mod restart;

pub use catalog::{ReferenceImage, ReferenceImageCatalog, ReferenceImageSet, StaticCatalog};
pub use controller::{
    ControllerConfig, RunOptions, SessionController, SessionEvent, SessionFailure,
    TrackingSession, CONTENT_HINT_MESSAGE, DEFAULT_CONTENT_HINT_DELAY, DEFAULT_ESCALATION_DELAY,
    FAILURE_ALERT_ACTION, FAILURE_ALERT_TITLE, INTERRUPTED_MESSAGE, RESETTING_MESSAGE,
};
pub use restart::{RestartGate, DEFAULT_RESTART_COOLDOWN};
