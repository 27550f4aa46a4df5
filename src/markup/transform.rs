use crate::markup::model::Point;

/// `screen = image * scale + offset` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisAlignedMap {
    scale: f32,
    offset: Point,
}

impl AxisAlignedMap {
    const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Point::new(0.0, 0.0),
    };

    fn apply(self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    fn inverted(self) -> Self {
        let inv = 1.0 / self.scale;
        Self {
            scale: inv,
            offset: Point::new(-self.offset.x * inv, -self.offset.y * inv),
        }
    }
}

/// Maps between viewport pixels and image pixels.
///
/// The image always fits the viewport width; the only free parameters are the
/// translation components, which are kept inside the pan bounds. Forward and
/// inverse maps are only ever written together through [`ViewTransform::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    viewport: (u32, u32),
    image: Option<(u32, u32)>,
    forward: AxisAlignedMap,
    inverse: AxisAlignedMap,
    dirty: bool,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            viewport: (0, 0),
            image: None,
            forward: AxisAlignedMap::IDENTITY,
            inverse: AxisAlignedMap::IDENTITY,
            dirty: false,
        }
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the viewport size. A zero dimension defers recomputation until a
    /// later non-zero call.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        let changed = self.viewport != (width, height);
        self.viewport = (width, height);
        if !self.viewport_known() {
            tracing::debug!(width, height, "viewport not laid out yet, deferring transform");
            return;
        }
        if self.dirty {
            self.recompute_for_image();
        } else if changed && self.image.is_some() {
            // Keep the current pan where possible; only the scale is re-derived.
            let translate = self.forward.offset;
            self.commit(self.fit_width_scale(), translate);
        }
    }

    /// Called whenever the image changes. Resets the pan; the actual recomputation
    /// waits for a known viewport.
    pub fn set_image(&mut self, width: u32, height: u32) {
        self.image = Some((width, height));
        self.dirty = true;
        if self.viewport_known() {
            self.recompute_for_image();
        }
    }

    /// Shifts the image by a screen-space delta, clamped to the pan bounds.
    /// Returns `false` when the transform is not ready and nothing moved.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        let offset = self.forward.offset;
        self.commit(
            self.forward.scale,
            Point::new(offset.x + delta_x, offset.y + delta_y),
        );
        true
    }

    pub fn to_image_space(&self, screen: Point) -> Point {
        self.inverse.apply(screen)
    }

    pub fn to_screen_space(&self, image: Point) -> Point {
        self.forward.apply(image)
    }

    /// True once both an image and a laid-out viewport are known and the maps
    /// reflect them.
    pub fn is_ready(&self) -> bool {
        self.image.is_some() && self.viewport_known() && !self.dirty
    }

    pub fn scale(&self) -> f32 {
        self.forward.scale
    }

    pub fn translate(&self) -> Point {
        self.forward.offset
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image
    }

    pub fn scaled_image_size(&self) -> Option<(f32, f32)> {
        let (w, h) = self.image?;
        Some((w as f32 * self.forward.scale, h as f32 * self.forward.scale))
    }

    /// Native image pixels per displayed pixel: converts a screen-space stroke
    /// width into the equivalent width at the image's own resolution.
    pub fn display_to_native_factor(&self) -> f32 {
        match self.scaled_image_size() {
            Some((scaled_w, _)) if scaled_w > 0.0 => {
                let native_w = self.image.map(|(w, _)| w as f32).unwrap_or(scaled_w);
                native_w / scaled_w
            }
            _ => 1.0,
        }
    }

    fn viewport_known(&self) -> bool {
        self.viewport.0 > 0 && self.viewport.1 > 0
    }

    fn fit_width_scale(&self) -> f32 {
        match self.image {
            Some((w, _)) if w > 0 => self.viewport.0 as f32 / w as f32,
            _ => 1.0,
        }
    }

    fn recompute_for_image(&mut self) {
        self.commit(self.fit_width_scale(), Point::new(0.0, 0.0));
        self.dirty = false;
        tracing::debug!(
            scale = self.forward.scale,
            tx = self.forward.offset.x,
            ty = self.forward.offset.y,
            "transform recomputed for image"
        );
    }

    fn commit(&mut self, scale: f32, translate: Point) {
        let clamped = self.clamp_translate(scale, translate);
        self.forward = AxisAlignedMap {
            scale,
            offset: clamped,
        };
        self.inverse = self.forward.inverted();
    }

    fn clamp_translate(&self, scale: f32, translate: Point) -> Point {
        let Some((w, h)) = self.image else {
            return translate;
        };
        Point::new(
            clamp_axis(translate.x, self.viewport.0 as f32, w as f32 * scale),
            clamp_axis(translate.y, self.viewport.1 as f32, h as f32 * scale),
        )
    }
}

/// Centers the image on an axis where it fits, otherwise keeps it covering the
/// viewport.
fn clamp_axis(translate: f32, viewport: f32, scaled: f32) -> f32 {
    if scaled <= viewport {
        (viewport - scaled) / 2.0
    } else {
        translate.clamp(viewport - scaled, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(viewport: (u32, u32), image: (u32, u32)) -> ViewTransform {
        let mut transform = ViewTransform::new();
        transform.set_viewport(viewport.0, viewport.1);
        transform.set_image(image.0, image.1);
        transform
    }

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn set_image_fits_viewport_width() {
        let transform = ready((500, 800), (1000, 2000));
        assert_eq!(transform.scale(), 500.0 / 1000.0);
        assert_eq!(transform.translate(), Point::new(0.0, 0.0));
    }

    #[test]
    fn short_image_is_centered_vertically() {
        let transform = ready((400, 800), (800, 400));
        // scaled to 400x200
        assert_eq!(transform.translate(), Point::new(0.0, 300.0));
    }

    #[test]
    fn pan_is_clamped_to_far_edge() {
        let mut transform = ready((500, 800), (1000, 2000));
        assert!(transform.pan(0.0, -10_000.0));
        assert_eq!(transform.translate().y, 800.0 - 1000.0);
        assert!(transform.pan(0.0, 10_000.0));
        assert_eq!(transform.translate().y, 0.0);
    }

    #[test]
    fn pan_cannot_move_centered_axis() {
        let mut transform = ready((400, 800), (800, 400));
        transform.pan(35.0, -80.0);
        assert_eq!(transform.translate(), Point::new(0.0, 300.0));
    }

    #[test]
    fn zero_viewport_defers_recompute() {
        let mut transform = ViewTransform::new();
        transform.set_viewport(0, 0);
        transform.set_image(1000, 2000);
        assert!(!transform.is_ready());
        assert!(!transform.pan(0.0, -10.0));

        transform.set_viewport(500, 0);
        assert!(!transform.is_ready());

        transform.set_viewport(500, 800);
        assert!(transform.is_ready());
        assert_eq!(transform.scale(), 0.5);
    }

    #[test]
    fn inverse_tracks_forward_after_pan() {
        let mut transform = ready((500, 800), (1000, 2000));
        transform.pan(0.0, -50.0);
        let p = Point::new(321.5, 1234.25);
        assert_close(transform.to_image_space(transform.to_screen_space(p)), p);
        assert_close(
            transform.to_image_space(Point::new(100.0, 100.0)),
            Point::new(200.0, 300.0),
        );
    }

    #[test]
    fn viewport_resize_rescales_and_reclamps() {
        let mut transform = ready((500, 800), (1000, 2000));
        transform.pan(0.0, -150.0);
        transform.set_viewport(250, 400);
        assert_eq!(transform.scale(), 0.25);
        // scaled height 500, viewport 400: pan range is [-100, 0]
        assert_eq!(transform.translate().y, -100.0);
    }

    #[test]
    fn display_to_native_factor_is_inverse_scale() {
        let transform = ready((500, 800), (2000, 1000));
        assert!((transform.display_to_native_factor() - 4.0).abs() < 1e-6);
    }
}
