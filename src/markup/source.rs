use crate::markup::error::{MarkupError, MarkupResult};
use image::RgbaImage;
use std::path::PathBuf;

/// Supplies decoded bitmaps to the surface. Where the bytes come from is the
/// implementor's business.
pub trait ImageSource {
    fn describe(&self) -> String;
    fn decode(&self) -> MarkupResult<RgbaImage>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileImageSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn decode(&self) -> MarkupResult<RgbaImage> {
        let bytes = std::fs::read(&self.path).map_err(|source| MarkupError::ImageRead {
            path: self.path.clone(),
            source,
        })?;
        decode_rgba(&bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImageSource {
    label: String,
    bytes: Vec<u8>,
}

impl MemoryImageSource {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }
}

impl ImageSource for MemoryImageSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn decode(&self) -> MarkupResult<RgbaImage> {
        decode_rgba(&self.bytes)
    }
}

fn decode_rgba(bytes: &[u8]) -> MarkupResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(MarkupError::InvalidImage { width, height });
    }
    Ok(decoded)
}
