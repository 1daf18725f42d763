//! Camera tracking quality as reported by the tracking session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why tracking is limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedReason {
    ExcessiveMotion,
    InsufficientFeatures,
    Initializing,
    Relocalizing,
    Other,
}

/// Pose-tracking quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum TrackingState {
    NotAvailable,
    Normal,
    Limited(LimitedReason),
}

impl TrackingState {
    /// Short status shown on every tracking change.
    pub fn presentation_string(self) -> &'static str {
        match self {
            TrackingState::NotAvailable => "Tracking unavailable",
            TrackingState::Normal => "Tracking normal",
            TrackingState::Limited(LimitedReason::ExcessiveMotion) => {
                "Tracking limited\nExcessive motion"
            }
            TrackingState::Limited(LimitedReason::InsufficientFeatures) => {
                "Tracking limited\nLow detail"
            }
            TrackingState::Limited(LimitedReason::Initializing) => "Initializing",
            TrackingState::Limited(LimitedReason::Relocalizing) => "Recovering from interruption",
            TrackingState::Limited(LimitedReason::Other) => "Tracking limited\nUnspecified reason",
        }
    }

    /// Recovery hint appended to the escalated message, when there is one.
    pub fn recommendation(self) -> Option<&'static str> {
        match self {
            TrackingState::Limited(LimitedReason::ExcessiveMotion) => {
                Some("Try slowing down your movement, or reset the session.")
            }
            TrackingState::Limited(LimitedReason::InsufficientFeatures) => {
                Some("Try pointing at a flat surface, or reset the session.")
            }
            TrackingState::Limited(LimitedReason::Relocalizing) => {
                Some("Return to the location where you left off or try resetting the session.")
            }
            _ => None,
        }
    }

    /// Whether this state should escalate into guidance if it persists.
    pub fn is_degraded(self) -> bool {
        !matches!(self, TrackingState::Normal)
    }
}

impl fmt::Display for TrackingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackingState::NotAvailable => "not-available",
            TrackingState::Normal => "normal",
            TrackingState::Limited(LimitedReason::ExcessiveMotion) => "excessive-motion",
            TrackingState::Limited(LimitedReason::InsufficientFeatures) => "insufficient-features",
            TrackingState::Limited(LimitedReason::Initializing) => "initializing",
            TrackingState::Limited(LimitedReason::Relocalizing) => "relocalizing",
            TrackingState::Limited(LimitedReason::Other) => "limited",
        };
        f.write_str(name)
    }
}

impl FromStr for TrackingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "not-available" | "unavailable" => Ok(TrackingState::NotAvailable),
            "normal" => Ok(TrackingState::Normal),
            "excessive-motion" => Ok(TrackingState::Limited(LimitedReason::ExcessiveMotion)),
            "insufficient-features" => {
                Ok(TrackingState::Limited(LimitedReason::InsufficientFeatures))
            }
            "initializing" => Ok(TrackingState::Limited(LimitedReason::Initializing)),
            "relocalizing" => Ok(TrackingState::Limited(LimitedReason::Relocalizing)),
            "limited" | "other" => Ok(TrackingState::Limited(LimitedReason::Other)),
            other => Err(format!("unknown tracking state: {other}")),
        }
    }
}
