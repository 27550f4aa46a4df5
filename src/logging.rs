use once_cell::sync::OnceCell;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILE_NAME: &str = "photo_markup.log";

// Dropping the guard would stop the background writer.
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. `debug` selects the `debug` level and lets `RUST_LOG`
/// override it; otherwise the level is pinned to `info`.
/// With `log_file` set, output goes to that file instead of stderr.
///
/// Calling this more than once is a no-op.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let filter = build_filter(debug);

    match log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(&path);
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let installed = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .is_ok();
            if installed {
                let _ = FILE_GUARD.set(guard);
            }
        }
        None => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }
}

fn build_filter(debug: bool) -> EnvFilter {
    // Without debug logging a stray RUST_LOG must not turn on verbose output.
    let level = if debug { "debug" } else { "info" };
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}

fn split_log_path(path: &Path) -> (PathBuf, OsString) {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from(DEFAULT_LOG_FILE_NAME));
    (dir, file_name)
}
