use crate::markup::controller::MarkupController;
use crate::markup::input::PointerEvent;
use crate::markup::messages::{Feedback, MarkupCommand};
use crate::markup::save::ImageSink;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A recorded interaction: pointer events and commands in arrival order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkupSession {
    #[serde(default)]
    pub viewport: Option<(u32, u32)>,
    #[serde(default)]
    pub steps: Vec<SessionStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    Pointer(PointerEvent),
    Pan { dx: f32, dy: f32 },
    Command(MarkupCommand),
}

impl MarkupSession {
    pub fn from_json(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content).context("deserialize markup session")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read markup session {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parse {}", path.display()))
    }
}

/// Replays `session` onto the controller and collects the feedback of every command.
pub fn replay<S: ImageSink>(
    controller: &mut MarkupController<S>,
    session: &MarkupSession,
) -> Vec<Feedback> {
    if let Some((width, height)) = session.viewport {
        controller.surface_mut().set_viewport(width, height);
    }
    let mut feedback = Vec::new();
    for step in &session.steps {
        match step {
            SessionStep::Pointer(event) => controller.handle_pointer(event),
            SessionStep::Pan { dx, dy } => controller.surface_mut().pan(*dx, *dy),
            SessionStep::Command(command) => feedback.push(controller.dispatch(*command)),
        }
    }
    tracing::debug!(
        steps = session.steps.len(),
        commands = feedback.len(),
        "session replayed"
    );
    feedback
}
