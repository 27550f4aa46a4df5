use crate::markup::model::{Color, Point, Stroke, StrokeStyle};
use crate::markup::transform::ViewTransform;
use image::{Rgba, RgbaImage};

pub const VIEW_BACKGROUND: Color = Color::rgba(0, 0, 0, 255);

// Far outside any raster; keeps rect arithmetic clear of i32 overflow.
const PIXEL_COORD_LIMIT: f32 = 16_777_216.0;

/// Half-open pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Bounds of the segment `a..b` grown by `pad` pixels on every side.
    pub fn from_points(a: Point, b: Point, pad: f32) -> Self {
        let min_x = to_pixel((a.x.min(b.x) - pad).floor());
        let max_x = to_pixel((a.x.max(b.x) + pad).ceil());
        let min_y = to_pixel((a.y.min(b.y) - pad).floor());
        let max_y = to_pixel((a.y.max(b.y) + pad).ceil());
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1).max(1),
            height: (max_y - min_y + 1).max(1),
        }
    }

    pub fn union(self, other: PixelRect) -> PixelRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        PixelRect {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).max(1),
            height: max_y.saturating_sub(min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<PixelRect> {
        let max_w = width as i32;
        let max_h = height as i32;
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.right().clamp(0, max_w);
        let y1 = self.bottom().clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

fn to_pixel(value: f32) -> i32 {
    // NaN falls through `clamp` and casts to 0.
    value.clamp(-PIXEL_COORD_LIMIT, PIXEL_COORD_LIMIT) as i32
}

pub fn stroke_bounds(points: &[Point], stroke_width: f32) -> Option<PixelRect> {
    let pad = stroke_width * 0.5 + 1.0;
    let first = points.first().copied()?;
    let mut rect = PixelRect::from_points(first, first, pad);
    for segment in points.windows(2) {
        rect = rect.union(PixelRect::from_points(segment[0], segment[1], pad));
    }
    Some(rect)
}

/// Draws a polyline with round caps and round joins.
///
/// Coverage is collected into a mask first so overlapping segments blend each
/// pixel only once.
pub fn rasterize_stroke(target: &mut RgbaImage, points: &[Point], style: StrokeStyle) {
    let Some(bounds) = stroke_bounds(points, style.width) else {
        return;
    };
    let Some(clip) = bounds.clamp(target.width(), target.height()) else {
        return;
    };

    let radius = (style.width * 0.5).max(0.5);
    let radius_sq = radius * radius;
    let mask_w = clip.width as usize;
    let mut mask = vec![false; mask_w * clip.height as usize];

    let segments: Vec<(Point, Point)> = if points.len() == 1 {
        vec![(points[0], points[0])]
    } else {
        points.windows(2).map(|s| (s[0], s[1])).collect()
    };

    let reach = f64::from(radius) + 1.0;
    let window = (
        (-reach, -reach),
        (
            f64::from(target.width()) + reach,
            f64::from(target.height()) + reach,
        ),
    );

    for (start, end) in segments {
        // Points far off the raster lose precision in f32; measure against the visible part.
        let Some((start, end)) = clip_segment(start, end, window.0, window.1) else {
            continue;
        };
        let Some(seg) = PixelRect::from_points(start, end, radius + 1.0).clamp(
            target.width(),
            target.height(),
        ) else {
            continue;
        };
        for y in seg.y.max(clip.y)..(seg.y + seg.height).min(clip.y + clip.height) {
            let row = (y - clip.y) as usize * mask_w;
            for x in seg.x.max(clip.x)..(seg.x + seg.width).min(clip.x + clip.width) {
                let idx = row + (x - clip.x) as usize;
                if mask[idx] {
                    continue;
                }
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if point_segment_distance_sq(center, start, end) <= radius_sq {
                    mask[idx] = true;
                }
            }
        }
    }

    for (i, covered) in mask.iter().enumerate() {
        if !covered {
            continue;
        }
        let x = clip.x as u32 + (i % mask_w) as u32;
        let y = clip.y as u32 + (i / mask_w) as u32;
        blend_pixel(target, x, y, style.color);
    }
}

pub fn rasterize_strokes<'a>(
    target: &mut RgbaImage,
    strokes: impl IntoIterator<Item = &'a Stroke>,
    style: StrokeStyle,
) {
    for stroke in strokes {
        rasterize_stroke(target, stroke.points(), style);
    }
}

/// Strokes mapped into screen space for hosts that draw with their own renderer.
pub fn screen_strokes<'a>(
    transform: &ViewTransform,
    strokes: impl IntoIterator<Item = &'a Stroke>,
) -> Vec<Stroke> {
    strokes
        .into_iter()
        .map(|stroke| stroke.map_points(|p| transform.to_screen_space(p)))
        .collect()
}

/// Renders one viewport-sized frame: the image through the forward transform,
/// then every stroke at the fixed on-screen width.
pub fn render_view<'a>(
    image: Option<&RgbaImage>,
    transform: &ViewTransform,
    strokes: impl IntoIterator<Item = &'a Stroke>,
    style: StrokeStyle,
) -> RgbaImage {
    let (width, height) = transform.viewport();
    let mut frame = RgbaImage::from_pixel(width, height, Rgba(VIEW_BACKGROUND.to_rgba_array()));
    let Some(image) = image else {
        return frame;
    };
    if !transform.is_ready() {
        return frame;
    }

    for y in 0..height {
        for x in 0..width {
            let source = transform.to_image_space(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            if source.x < 0.0 || source.y < 0.0 {
                continue;
            }
            let (sx, sy) = (source.x as u32, source.y as u32);
            if sx < image.width() && sy < image.height() {
                frame.put_pixel(x, y, *image.get_pixel(sx, sy));
            }
        }
    }

    for stroke in screen_strokes(transform, strokes) {
        rasterize_stroke(&mut frame, stroke.points(), style);
    }
    frame
}

/// Liang-Barsky clip of `start..end` to the box `min..max`.
fn clip_segment(
    start: Point,
    end: Point,
    min: (f64, f64),
    max: (f64, f64),
) -> Option<(Point, Point)> {
    let (x0, y0) = (f64::from(start.x), f64::from(start.y));
    let (dx, dy) = (f64::from(end.x) - x0, f64::from(end.y) - y0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min.0),
        (dx, max.0 - x0),
        (-dy, y0 - min.1),
        (dy, max.1 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
    Some((at(t0), at(t1)))
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let vx = end.x - start.x;
    let vy = end.y - start.y;
    let wx = point.x - start.x;
    let wy = point.y - start.y;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = point.x - (start.x + vx * t);
    let dy = point.y - (start.y + vy * t);
    dx * dx + dy * dy
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Color) {
    if color.a == 0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let sa = color.a as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= f32::EPSILON {
        return;
    }
    let blend = |s: u8, d: u8| -> u8 {
        (((s as f32 * sa) + (d as f32 * da * (1.0 - sa))) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        Rgba([
            blend(color.r, dst[0]),
            blend(color.g, dst[1]),
            blend(color.b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::model::STROKE_COLOR;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn style(width: f32) -> StrokeStyle {
        StrokeStyle {
            width,
            color: STROKE_COLOR,
        }
    }

    fn painted(img: &RgbaImage) -> usize {
        img.pixels().filter(|px| **px != WHITE).count()
    }

    #[test]
    fn single_point_renders_round_dot() {
        let mut img = RgbaImage::from_pixel(21, 21, WHITE);
        rasterize_stroke(&mut img, &[Point::new(10.5, 10.5)], style(10.0));

        assert_eq!(img.get_pixel(10, 10).0, STROKE_COLOR.to_rgba_array());
        assert_eq!(*img.get_pixel(10, 5), Rgba(STROKE_COLOR.to_rgba_array()));
        // corners of the bounding square stay untouched: the cap is round
        assert_eq!(*img.get_pixel(6, 6), WHITE);
        assert_eq!(*img.get_pixel(14, 14), WHITE);
    }

    #[test]
    fn segment_covers_its_length_with_round_caps() {
        let mut img = RgbaImage::from_pixel(40, 20, WHITE);
        rasterize_stroke(
            &mut img,
            &[Point::new(10.0, 10.0), Point::new(30.0, 10.0)],
            style(4.0),
        );
        for x in 10..30 {
            assert_ne!(*img.get_pixel(x, 10), WHITE, "gap at x={x}");
        }
        assert_ne!(*img.get_pixel(8, 10), WHITE);
        assert_eq!(*img.get_pixel(5, 10), WHITE);
        assert_eq!(*img.get_pixel(20, 14), WHITE);
    }

    #[test]
    fn wider_style_paints_more_pixels() {
        let points = [Point::new(5.0, 5.0), Point::new(50.0, 40.0)];
        let mut thin = RgbaImage::from_pixel(64, 64, WHITE);
        let mut thick = RgbaImage::from_pixel(64, 64, WHITE);
        rasterize_stroke(&mut thin, &points, style(2.0));
        rasterize_stroke(&mut thick, &points, style(8.0));
        assert!(painted(&thick) > painted(&thin) * 3);
    }

    #[test]
    fn translucent_color_blends_once_at_joins() {
        let mut img = RgbaImage::from_pixel(30, 30, WHITE);
        let translucent = StrokeStyle {
            width: 6.0,
            color: Color::rgba(0, 0, 0, 128),
        };
        rasterize_stroke(
            &mut img,
            &[
                Point::new(5.0, 15.0),
                Point::new(15.0, 15.0),
                Point::new(15.0, 25.0),
            ],
            translucent,
        );
        let join = img.get_pixel(15, 15).0;
        let arm = img.get_pixel(8, 15).0;
        assert_eq!(join, arm);
    }

    #[test]
    fn strokes_outside_target_are_clipped() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        rasterize_stroke(
            &mut img,
            &[Point::new(-50.0, -50.0), Point::new(-20.0, -30.0)],
            style(4.0),
        );
        assert_eq!(painted(&img), 0);
    }

    #[test]
    fn rect_from_huge_coordinates_stays_finite() {
        let rect = PixelRect::from_points(Point::new(-2e9, 10.0), Point::new(2e9, 10.0), 7.0);
        assert!(rect.width > 0 && rect.height > 0);
        let merged = rect.union(PixelRect::from_points(
            Point::new(f32::MAX, f32::MIN),
            Point::new(f32::MIN, f32::MAX),
            1.0,
        ));
        assert_eq!(merged.clamp(10, 10), Some(PixelRect { x: 0, y: 0, width: 10, height: 10 }));
    }

    #[test]
    fn segment_spanning_billions_of_pixels_still_paints_its_visible_part() {
        let mut img = RgbaImage::from_pixel(20, 20, WHITE);
        rasterize_stroke(
            &mut img,
            &[Point::new(-2e9, 10.0), Point::new(2e9, 10.0)],
            style(4.0),
        );
        for x in 0..20 {
            assert_ne!(*img.get_pixel(x, 10), WHITE, "gap at x={x}");
        }
        assert_eq!(*img.get_pixel(10, 2), WHITE);
    }

    #[test]
    fn clip_segment_rejects_segments_outside_the_box() {
        let outside = clip_segment(
            Point::new(-10.0, -10.0),
            Point::new(-5.0, 30.0),
            (0.0, 0.0),
            (20.0, 20.0),
        );
        assert_eq!(outside, None);
        let (a, b) = clip_segment(
            Point::new(-10.0, 5.0),
            Point::new(30.0, 5.0),
            (0.0, 0.0),
            (20.0, 20.0),
        )
        .expect("crosses box");
        assert_eq!((a, b), (Point::new(0.0, 5.0), Point::new(20.0, 5.0)));
    }

    #[test]
    fn render_view_draws_image_through_transform() {
        let mut transform = ViewTransform::new();
        transform.set_viewport(4, 8);
        transform.set_image(8, 8);

        let mut image = RgbaImage::from_pixel(8, 8, WHITE);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            image.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }

        let frame = render_view(Some(&image), &transform, std::iter::empty(), style(1.0));
        // 8x8 at scale 0.5 is 4x4, centered vertically in a 4x8 viewport
        assert_eq!(*frame.get_pixel(0, 0), Rgba(VIEW_BACKGROUND.to_rgba_array()));
        assert_eq!(*frame.get_pixel(0, 2), Rgba([0, 255, 0, 255]));
        assert_eq!(*frame.get_pixel(3, 5), WHITE);
    }
}
