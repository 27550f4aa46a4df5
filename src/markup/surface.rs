use crate::markup::bake::{bake_strokes_with, duplicate_raster};
use crate::markup::error::{MarkupError, MarkupResult};
use crate::markup::history::StrokeHistory;
use crate::markup::input::{GestureEngine, GestureOutcome, GestureState, PointerEvent};
use crate::markup::model::{ImageHandle, Stroke, StrokeStyle};
use crate::markup::render::{render_view, screen_strokes};
use crate::markup::source::ImageSource;
use crate::markup::transform::ViewTransform;
use image::RgbaImage;
use std::sync::Arc;

/// The interactive drawing surface: owns the current image, the view transform,
/// the gesture state and the stroke history.
///
/// Everything runs on the caller's thread; `&mut self` serialises all mutation.
#[derive(Debug, Default)]
pub struct DrawingSurface {
    image: Option<ImageHandle>,
    transform: ViewTransform,
    gesture: GestureEngine,
    history: StrokeHistory,
    style: StrokeStyle,
    redraw_requested: bool,
}

impl DrawingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.transform.set_viewport(width, height);
        self.redraw_requested = true;
    }

    /// Replaces the current image, dropping all strokes and any gesture in progress.
    pub fn load_image(&mut self, image: RgbaImage) -> MarkupResult<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(MarkupError::InvalidImage { width, height });
        }
        self.image = Some(Arc::new(image));
        self.transform.set_image(width, height);
        self.gesture.reset();
        let dropped = self.history.clear();
        self.redraw_requested = true;
        tracing::info!(width, height, dropped_strokes = dropped, "image loaded");
        Ok(())
    }

    /// Decodes from `source` and loads the result. On decode failure the surface is unchanged.
    pub fn load_from(&mut self, source: &dyn ImageSource) -> MarkupResult<()> {
        let image = source.decode().map_err(|err| {
            tracing::warn!(source = %source.describe(), error = %err, "image decode failed");
            err
        })?;
        self.load_image(image)
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        if self.image.is_none() {
            return;
        }
        let outcome = self.gesture.handle(event, &mut self.transform);
        if outcome.needs_redraw() {
            self.redraw_requested = true;
        }
        if let GestureOutcome::StrokeFinished(stroke) = outcome {
            tracing::debug!(points = stroke.len(), total = self.history.len() + 1, "stroke committed");
            self.history.commit(stroke);
        }
    }

    /// Shifts the view by a screen-space delta within the pan bounds.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        if self.transform.pan(delta_x, delta_y) {
            self.redraw_requested = true;
        }
    }

    pub fn undo(&mut self) -> bool {
        let removed = self.history.undo();
        if removed {
            self.redraw_requested = true;
        }
        removed
    }

    /// Empties the history. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let removed = self.history.clear() > 0;
        if removed {
            self.redraw_requested = true;
        }
        removed
    }

    pub fn has_strokes(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Composites every finished stroke into the image at native resolution.
    ///
    /// On success the baked image becomes current and the history is emptied; on
    /// failure nothing changes.
    pub fn bake(&mut self) -> MarkupResult<ImageHandle> {
        self.bake_with(duplicate_raster)
    }

    pub(crate) fn bake_with(
        &mut self,
        duplicate: impl FnOnce(&RgbaImage) -> MarkupResult<RgbaImage>,
    ) -> MarkupResult<ImageHandle> {
        let image = self.image.as_ref().ok_or(MarkupError::NoImageLoaded)?;
        if self.history.is_empty() {
            return Err(MarkupError::EmptyHistory);
        }
        let baked = bake_strokes_with(
            image,
            self.history.strokes(),
            &self.transform,
            self.style,
            duplicate,
        )
        .map_err(|err| {
            tracing::error!(error = %err, "bake failed");
            err
        })?;

        let (width, height) = baked.dimensions();
        let handle = Arc::new(baked);
        self.image = Some(handle.clone());
        self.transform.set_image(width, height);
        let baked_strokes = self.history.clear();
        self.redraw_requested = true;
        tracing::info!(width, height, strokes = baked_strokes, "strokes baked into image");
        Ok(handle)
    }

    /// Snapshot of the current image; later loads or bakes never alter it.
    pub fn current_bitmap(&self) -> Option<ImageHandle> {
        self.image.clone()
    }

    pub fn strokes(&self) -> &[Stroke] {
        self.history.strokes()
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.gesture.in_progress()
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Returns and resets the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// History strokes followed by the in-progress stroke, in screen space.
    pub fn screen_strokes(&self) -> Vec<Stroke> {
        screen_strokes(&self.transform, self.visible_strokes())
    }

    /// Renders the current view into a viewport-sized frame.
    pub fn render_frame(&self) -> RgbaImage {
        render_view(
            self.image.as_deref(),
            &self.transform,
            self.visible_strokes(),
            self.style,
        )
    }

    fn visible_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.history.strokes().iter().chain(self.gesture.in_progress())
    }
}
