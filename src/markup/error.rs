use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the drawing core. Every failure leaves the surface
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("no image loaded")]
    NoImageLoaded,
    #[error("no strokes to bake")]
    EmptyHistory,
    #[error("could not decode image: {source}")]
    DecodeFailure {
        #[from]
        source: image::ImageError,
    },
    #[error("could not read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("image has no pixels ({width}x{height})")]
    InvalidImage { width: u32, height: u32 },
    #[error("could not allocate a {width}x{height} raster for baking")]
    RasterAllocationFailure { width: u32, height: u32 },
    #[error("could not export image to {path}: {source}")]
    Export {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub type MarkupResult<T> = Result<T, MarkupError>;
