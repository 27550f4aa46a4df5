use crate::markup::error::{MarkupError, MarkupResult};
use crate::markup::model::ImageHandle;
use anyhow::{anyhow, Context, Result};
use chrono::Local;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKUP_EXPORT_SUBDIR: &str = "markup_exports";

/// Receives baked images for persistence.
pub trait ImageSink {
    /// Persists the snapshot and returns where it went.
    fn store(&mut self, image: &ImageHandle) -> MarkupResult<PathBuf>;
}

/// Writes lossless PNG files named `<prefix>_<timestamp>.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngFileSink {
    output_dir: PathBuf,
    prefix: String,
}

impl PngFileSink {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn target_path(&self, now: chrono::DateTime<Local>) -> PathBuf {
        let stem = format!("{}_{}", self.prefix, timestamped_stem(now));
        let mut candidate = self.output_dir.join(build_filename(&stem, None));
        let mut counter = 1;
        while candidate.exists() {
            candidate = self.output_dir.join(build_filename(&stem, Some(counter)));
            counter += 1;
        }
        candidate
    }
}

impl ImageSink for PngFileSink {
    fn store(&mut self, image: &ImageHandle) -> MarkupResult<PathBuf> {
        let path = self.target_path(Local::now());
        if let Err(err) = fs::create_dir_all(&self.output_dir) {
            return Err(MarkupError::Export {
                path,
                source: image::ImageError::IoError(err),
            });
        }
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| MarkupError::Export {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "baked image exported");
        Ok(path)
    }
}

/// Keeps snapshots in memory; for embedding hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySink {
    stored: Vec<ImageHandle>,
}

impl MemorySink {
    pub fn stored(&self) -> &[ImageHandle] {
        &self.stored
    }
}

impl ImageSink for MemorySink {
    fn store(&mut self, image: &ImageHandle) -> MarkupResult<PathBuf> {
        self.stored.push(image.clone());
        Ok(PathBuf::from(format!("memory://{}", self.stored.len())))
    }
}

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(MARKUP_EXPORT_SUBDIR))
}

/// Resolves the export folder: the configured one, or a folder next to the executable.
pub fn resolve_output_folder(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    exe_relative_output_folder_from_path(&exe_path)
}

pub fn timestamped_stem(now: chrono::DateTime<Local>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

pub fn build_filename(stem: &str, counter: Option<u32>) -> String {
    match counter {
        Some(n) => format!("{stem}_{n}.png"),
        None => format!("{stem}.png"),
    }
}
