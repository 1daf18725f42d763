use clap::Subcommand;
use imagedetection_core::TrackingState;
use serde::Serialize;

#[derive(Subcommand)]
pub enum TrackingAction {
    /// Print the status and recovery hint shown for a tracking state
    Describe {
        /// not-available, normal, excessive-motion, insufficient-features,
        /// initializing, relocalizing, limited
        state: TrackingState,
    },
    /// Describe every tracking state
    List,
}

#[derive(Serialize)]
struct Description {
    state: String,
    status: &'static str,
    recommendation: Option<&'static str>,
    escalates: bool,
}

fn describe(state: TrackingState) -> Description {
    Description {
        state: state.to_string(),
        status: state.presentation_string(),
        recommendation: state.recommendation(),
        escalates: state.is_degraded(),
    }
}

pub fn run(action: TrackingAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TrackingAction::Describe { state } => {
            println!("{}", serde_json::to_string_pretty(&describe(state))?);
        }
        TrackingAction::List => {
            let all: Vec<_> = [
                "not-available",
                "normal",
                "excessive-motion",
                "insufficient-features",
                "initializing",
                "relocalizing",
                "limited",
            ]
            .iter()
            .map(|name| name.parse::<TrackingState>().map(describe))
            .collect::<Result<_, _>>()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
    }
    Ok(())
}
