use crate::markup::error::MarkupError;
use crate::markup::input::PointerEvent;
use crate::markup::messages::{Feedback, MarkupCommand};
use crate::markup::save::ImageSink;
use crate::markup::surface::DrawingSurface;

/// Routes user commands to the surface and the sink, turning results into
/// [`Feedback`] for the host.
pub struct MarkupController<S: ImageSink> {
    surface: DrawingSurface,
    sink: S,
}

impl<S: ImageSink> MarkupController<S> {
    pub fn new(surface: DrawingSurface, sink: S) -> Self {
        Self { surface, sink }
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        self.surface.handle_pointer(event);
    }

    pub fn dispatch(&mut self, command: MarkupCommand) -> Feedback {
        if !self.surface.has_image() {
            return Feedback::NoImageLoaded;
        }
        let feedback = match command {
            MarkupCommand::Undo => {
                if self.surface.undo() {
                    Feedback::Undone
                } else {
                    Feedback::NothingToUndo
                }
            }
            MarkupCommand::Clear => {
                if self.surface.clear() {
                    Feedback::Cleared
                } else {
                    Feedback::NothingToClear
                }
            }
            MarkupCommand::BakeAndSave => self.bake_and_save(),
        };
        tracing::debug!(?command, ?feedback, "markup command handled");
        feedback
    }

    fn bake_and_save(&mut self) -> Feedback {
        let baked = match self.surface.bake() {
            Ok(baked) => baked,
            Err(MarkupError::EmptyHistory) => return Feedback::NothingToBake,
            Err(MarkupError::NoImageLoaded) => return Feedback::NoImageLoaded,
            Err(err) => {
                return Feedback::SaveFailed {
                    error: err.to_string(),
                }
            }
        };
        match self.sink.store(&baked) {
            Ok(path) => Feedback::Saved { path },
            Err(err) => {
                tracing::error!(error = %err, "saving baked image failed");
                Feedback::SaveFailed {
                    error: err.to_string(),
                }
            }
        }
    }
}
