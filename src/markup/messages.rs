use std::path::PathBuf;

/// User-facing outcome of a command, for the host to show as a toast or status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    NoImageLoaded,
    NothingToUndo,
    NothingToClear,
    NothingToBake,
    Undone,
    Cleared,
    Saved { path: PathBuf },
    SaveFailed { error: String },
}

impl Feedback {
    pub fn message(&self) -> String {
        match self {
            Feedback::NoImageLoaded => "Load an image first".to_string(),
            Feedback::NothingToUndo => "Nothing to undo".to_string(),
            Feedback::NothingToClear => "Nothing to clear".to_string(),
            Feedback::NothingToBake => "Draw something before saving".to_string(),
            Feedback::Undone => "Last stroke removed".to_string(),
            Feedback::Cleared => "All strokes cleared".to_string(),
            Feedback::Saved { path } => format!("Saved to {}", path.display()),
            Feedback::SaveFailed { error } => format!("Save failed: {error}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::SaveFailed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupCommand {
    Undo,
    Clear,
    BakeAndSave,
}
