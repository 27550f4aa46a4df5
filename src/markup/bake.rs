use crate::markup::error::{MarkupError, MarkupResult};
use crate::markup::model::{Stroke, StrokeStyle};
use crate::markup::render::rasterize_strokes;
use crate::markup::transform::ViewTransform;
use image::RgbaImage;

/// Composites `strokes` onto a native-resolution copy of `image`.
///
/// Strokes are already in image space; only the width needs converting from
/// viewport pixels to image pixels. `image` is never touched.
pub fn bake_strokes(
    image: &RgbaImage,
    strokes: &[Stroke],
    transform: &ViewTransform,
    display_style: StrokeStyle,
) -> MarkupResult<RgbaImage> {
    bake_strokes_with(image, strokes, transform, display_style, duplicate_raster)
}

/// [`bake_strokes`] with the buffer copy supplied by the caller.
pub(crate) fn bake_strokes_with(
    image: &RgbaImage,
    strokes: &[Stroke],
    transform: &ViewTransform,
    display_style: StrokeStyle,
    duplicate: impl FnOnce(&RgbaImage) -> MarkupResult<RgbaImage>,
) -> MarkupResult<RgbaImage> {
    if strokes.is_empty() {
        return Err(MarkupError::EmptyHistory);
    }

    let mut baked = duplicate(image)?;
    let factor = transform.display_to_native_factor();
    let native_style = display_style.scaled(factor);
    tracing::debug!(
        strokes = strokes.len(),
        factor,
        width = native_style.width,
        "rasterizing strokes at native resolution"
    );
    rasterize_strokes(&mut baked, strokes, native_style);
    Ok(baked)
}

/// Copies the pixel buffer without aborting on allocation failure.
pub fn duplicate_raster(image: &RgbaImage) -> MarkupResult<RgbaImage> {
    let (width, height) = image.dimensions();
    let source = image.as_raw();
    let mut pixels: Vec<u8> = Vec::new();
    pixels
        .try_reserve_exact(source.len())
        .map_err(|_| MarkupError::RasterAllocationFailure { width, height })?;
    pixels.extend_from_slice(source);
    RgbaImage::from_raw(width, height, pixels)
        .ok_or(MarkupError::RasterAllocationFailure { width, height })
}
