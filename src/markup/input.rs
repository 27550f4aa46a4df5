use crate::markup::model::{Point, Stroke};
use crate::markup::transform::ViewTransform;
use serde::{Deserialize, Serialize};

/// One finger on the surface, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: u32,
    pub position: Point,
}

impl Contact {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Pointer events as delivered by the input host.
///
/// `Down` and `Move` carry every contact pressed after the event. `Up` carries the
/// contacts still pressed after the lift, so an empty list means full release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { contacts: Vec<Contact> },
    Move { contacts: Vec<Contact> },
    Up { contacts: Vec<Contact> },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing(Stroke),
    Panning {
        anchor: Point,
        tracked: [u32; 2],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    StrokeStarted,
    StrokeExtended,
    StrokeFinished(Stroke),
    StrokeDiscarded,
    PanStarted,
    Panned { moved: bool },
    PanEnded,
}

impl GestureOutcome {
    pub fn needs_redraw(&self) -> bool {
        match self {
            GestureOutcome::Ignored | GestureOutcome::PanStarted | GestureOutcome::PanEnded => {
                false
            }
            GestureOutcome::Panned { moved } => *moved,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureEngine {
    state: GestureState,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        match &self.state {
            GestureState::Drawing(stroke) => Some(stroke),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }

    pub fn handle(&mut self, event: &PointerEvent, transform: &mut ViewTransform) -> GestureOutcome {
        if !transform.is_ready() {
            return GestureOutcome::Ignored;
        }

        let previous = state_label(&self.state);
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = match (state, event) {
            (GestureState::Idle, PointerEvent::Down { contacts }) => match contacts.as_slice() {
                [] => (GestureState::Idle, GestureOutcome::Ignored),
                [only] => (
                    GestureState::Drawing(Stroke::starting_at(
                        transform.to_image_space(only.position),
                    )),
                    GestureOutcome::StrokeStarted,
                ),
                many => (start_panning(many), GestureOutcome::PanStarted),
            },
            (GestureState::Idle, _) => (GestureState::Idle, GestureOutcome::Ignored),

            (GestureState::Drawing(mut stroke), PointerEvent::Move { contacts })
                if contacts.len() == 1 =>
            {
                stroke.push(transform.to_image_space(contacts[0].position));
                (GestureState::Drawing(stroke), GestureOutcome::StrokeExtended)
            }
            (
                GestureState::Drawing(stroke),
                PointerEvent::Down { contacts } | PointerEvent::Move { contacts },
            ) if contacts.len() >= 2 => {
                tracing::debug!(
                    points = stroke.len(),
                    "second contact arrived, discarding in-progress stroke"
                );
                (start_panning(contacts), GestureOutcome::StrokeDiscarded)
            }
            (GestureState::Drawing(stroke), PointerEvent::Up { contacts }) if contacts.is_empty() => {
                (GestureState::Idle, GestureOutcome::StrokeFinished(stroke))
            }
            (GestureState::Drawing(stroke), PointerEvent::Cancel) => {
                tracing::debug!(points = stroke.len(), "gesture canceled, stroke discarded");
                (GestureState::Idle, GestureOutcome::StrokeDiscarded)
            }
            (drawing @ GestureState::Drawing(_), _) => (drawing, GestureOutcome::Ignored),

            (GestureState::Panning { anchor, tracked }, PointerEvent::Move { contacts })
                if contacts.len() >= 2 =>
            {
                let (midpoint, tracked) = tracked_midpoint(contacts, tracked);
                let delta = midpoint - anchor;
                let moved = transform.pan(delta.x, delta.y);
                (
                    GestureState::Panning {
                        anchor: midpoint,
                        tracked,
                    },
                    GestureOutcome::Panned { moved },
                )
            }
            (
                GestureState::Panning { tracked, .. },
                PointerEvent::Down { contacts } | PointerEvent::Up { contacts },
            ) if contacts.len() >= 2 => {
                // Contact set changed without ending the pan: re-anchor so the image does not jump.
                let (anchor, tracked) = tracked_midpoint(contacts, tracked);
                (
                    GestureState::Panning { anchor, tracked },
                    GestureOutcome::Ignored,
                )
            }
            (GestureState::Panning { .. }, PointerEvent::Up { .. } | PointerEvent::Cancel) => {
                (GestureState::Idle, GestureOutcome::PanEnded)
            }
            (panning @ GestureState::Panning { .. }, _) => (panning, GestureOutcome::Ignored),
        };

        let current = state_label(&next);
        if current != previous {
            tracing::debug!(from = previous, to = current, ?outcome, "gesture transition");
        }
        self.state = next;
        outcome
    }
}

fn start_panning(contacts: &[Contact]) -> GestureState {
    let anchor = contacts[0].position.midpoint(contacts[1].position);
    GestureState::Panning {
        anchor,
        tracked: [contacts[0].id, contacts[1].id],
    }
}

/// Midpoint of the tracked pair, or of the first two contacts when either tracked
/// contact has lifted. Requires at least two contacts.
fn tracked_midpoint(contacts: &[Contact], tracked: [u32; 2]) -> (Point, [u32; 2]) {
    let find = |id: u32| contacts.iter().find(|c| c.id == id);
    match (find(tracked[0]), find(tracked[1])) {
        (Some(a), Some(b)) => (a.position.midpoint(b.position), tracked),
        _ => (
            contacts[0].position.midpoint(contacts[1].position),
            [contacts[0].id, contacts[1].id],
        ),
    }
}

fn state_label(state: &GestureState) -> &'static str {
    match state {
        GestureState::Idle => "idle",
        GestureState::Drawing(_) => "drawing",
        GestureState::Panning { .. } => "panning",
    }
}
