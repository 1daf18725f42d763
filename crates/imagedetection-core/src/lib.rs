//! # ImageDetection Core Library
//!
//! This library provides the status and session logic behind the
//! ImageDetection AR demo: a camera-tracking session detects known reference
//! images, each detection gets a short-lived highlight overlay, and a status
//! panel tells the user what tracking is doing.
//!
//! ## Architecture
//!
//! - **Message Scheduler**: A monotonic-clock state machine that owns the
//!   displayed message, its auto-hide timer, and one pending timer per
//!   message category. The caller passes `now` and calls `advance()`.
//! - **Session Controller**: Turns tracking-session callbacks into status
//!   messages, escalates persistent tracking problems, and debounces restarts
//! - **Runtime**: A single tokio task that owns the controller and fires its
//!   timers, so all state changes are serialized
//! - **Overlay**: Highlight plane description and a serial scene update queue
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`MessageScheduler`]: Core status message state machine
//! - [`SessionController`]: Tracking feedback and session lifecycle
//! - [`StatusService`]: Async owner task
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod overlay;
pub mod runtime;
pub mod session;
pub mod status;
pub mod storage;
pub mod timer;
pub mod tracking;

pub use error::{ConfigError, CoreError, RuntimeError, SessionError};
pub use events::Event;
pub use overlay::{AnchorId, OverlayNode, SceneGraph, SceneUpdateQueue};
pub use runtime::{StatusHandle, StatusService};
pub use session::{
    ControllerConfig, ReferenceImage, ReferenceImageCatalog, ReferenceImageSet, RestartGate,
    SessionController, SessionEvent, SessionFailure, StaticCatalog, TrackingSession,
};
pub use status::{MessageCategory, MessageScheduler, PanelCommand, PanelView, SchedulerConfig};
pub use storage::Config;
pub use tracking::{LimitedReason, TrackingState};
