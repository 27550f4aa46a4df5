use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = "photo_markup_settings.json";
const DEFAULT_VIEWPORT: (u32, u32) = (1080, 1920);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupSettings {
    /// Initialise the logger at debug level and honour `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Write logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Where baked images are written. Defaults to a folder next to the executable.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
    /// Viewport used when no host supplies one (headless runs).
    #[serde(default = "default_viewport")]
    pub viewport: (u32, u32),
}

fn default_export_prefix() -> String {
    "markup".to_string()
}

fn default_viewport() -> (u32, u32) {
    DEFAULT_VIEWPORT
}

impl Default for MarkupSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            export_dir: None,
            export_prefix: default_export_prefix(),
            viewport: default_viewport(),
        }
    }
}

impl MarkupSettings {
    /// Missing or empty files yield the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content)
            .with_context(|| format!("deserialize settings file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings folder {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }
}

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}
