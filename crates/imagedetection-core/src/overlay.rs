//! Highlight overlays for detected images.
//!
//! Image anchors are not tracked after first detection, so each detected
//! image gets a plane that flashes briefly and then removes itself. This
//! module only describes that overlay; drawing it is the renderer's job.
//!
//! Detection callbacks can arrive concurrently, so every scene mutation goes
//! through [`SceneUpdateQueue`], a single task applying updates in order.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::RuntimeError;
use crate::session::ReferenceImage;

/// Scene anchor the renderer attached to a detected image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(pub u64);

/// Plane covering the detected image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightPlane {
    pub width: f64,
    pub height: f64,
    /// Rotation about x. Planes are vertical in their own space while image
    /// anchors are horizontal, so this is always `-π/2`.
    pub euler_x: f64,
}

impl HighlightPlane {
    pub fn for_image(image: &ReferenceImage) -> Self {
        Self {
            width: image.physical_width,
            height: image.physical_height,
            euler_x: -FRAC_PI_2,
        }
    }
}

/// One step of the highlight animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HighlightStep {
    Wait { duration: Duration },
    FadeOpacity { to: f32, duration: Duration },
    FadeOut { duration: Duration },
    RemoveFromParent,
}

impl HighlightStep {
    pub fn duration(&self) -> Duration {
        match *self {
            HighlightStep::Wait { duration }
            | HighlightStep::FadeOpacity { duration, .. }
            | HighlightStep::FadeOut { duration } => duration,
            HighlightStep::RemoveFromParent => Duration::ZERO,
        }
    }
}

/// Flash twice, fade out, then remove.
pub fn highlight_sequence() -> Vec<HighlightStep> {
    let quarter = Duration::from_millis(250);
    vec![
        HighlightStep::Wait { duration: quarter },
        HighlightStep::FadeOpacity {
            to: 0.85,
            duration: quarter,
        },
        HighlightStep::FadeOpacity {
            to: 0.15,
            duration: quarter,
        },
        HighlightStep::FadeOpacity {
            to: 0.85,
            duration: quarter,
        },
        HighlightStep::FadeOut {
            duration: Duration::from_millis(500),
        },
        HighlightStep::RemoveFromParent,
    ]
}

/// Node to attach under a detected image's anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayNode {
    pub image_name: String,
    pub plane: HighlightPlane,
    pub actions: Vec<HighlightStep>,
}

impl OverlayNode {
    pub fn for_image(image: &ReferenceImage) -> Self {
        Self {
            image_name: image.name.clone(),
            plane: HighlightPlane::for_image(image),
            actions: highlight_sequence(),
        }
    }

    /// Time until the node removes itself.
    pub fn lifetime(&self) -> Duration {
        self.actions.iter().map(HighlightStep::duration).sum()
    }
}

/// The render graph (external).
pub trait SceneGraph: Send + 'static {
    fn add_overlay(&mut self, anchor: AnchorId, node: OverlayNode);
}

struct SceneUpdate {
    anchor: AnchorId,
    node: OverlayNode,
}

/// Serial executor for scene mutations.
pub struct SceneUpdateQueue<G> {
    tx: mpsc::UnboundedSender<SceneUpdate>,
    task: JoinHandle<G>,
}

impl<G: SceneGraph> SceneUpdateQueue<G> {
    /// Spawn the queue task on the current tokio runtime.
    pub fn spawn(mut graph: G) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SceneUpdate>();
        let task = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                debug!(image = %update.node.image_name, anchor = update.anchor.0, "adding overlay");
                graph.add_overlay(update.anchor, update.node);
            }
            graph
        });
        Self { tx, task }
    }

    /// Queue the highlight for a freshly detected image.
    pub fn image_detected(
        &self,
        anchor: AnchorId,
        image: &ReferenceImage,
    ) -> Result<(), RuntimeError> {
        self.tx.send(SceneUpdate {
            anchor,
            node: OverlayNode::for_image(image),
        })?;
        Ok(())
    }

    /// A sender usable from other detection callbacks.
    pub fn handle(&self) -> SceneUpdateHandle {
        SceneUpdateHandle {
            tx: self.tx.clone(),
        }
    }

    /// Apply everything queued so far, stop, and hand the graph back.
    ///
    /// Outstanding [`SceneUpdateHandle`]s keep the queue open until dropped.
    pub async fn shutdown(self) -> Result<G, RuntimeError> {
        drop(self.tx);
        Ok(self.task.await?)
    }
}

/// Cloneable producer side of a [`SceneUpdateQueue`].
#[derive(Clone)]
pub struct SceneUpdateHandle {
    tx: mpsc::UnboundedSender<SceneUpdate>,
}

impl SceneUpdateHandle {
    pub fn image_detected(
        &self,
        anchor: AnchorId,
        image: &ReferenceImage,
    ) -> Result<(), RuntimeError> {
        self.tx.send(SceneUpdate {
            anchor,
            node: OverlayNode::for_image(image),
        })?;
        Ok(())
    }
}
