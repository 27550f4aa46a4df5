use anyhow::{Context, Result};
use clap::Parser;
use photo_markup::markup::replay::{replay, MarkupSession};
use photo_markup::markup::save::{resolve_output_folder, PngFileSink};
use photo_markup::markup::source::FileImageSource;
use photo_markup::markup::{DrawingSurface, MarkupController};
use photo_markup::settings::{resolve_settings_path, MarkupSettings};
use std::path::PathBuf;

/// Headless photo markup: load a photo, replay recorded strokes, bake and save.
#[derive(Parser, Debug)]
#[command(name = "photo_markup", version)]
struct CliArgs {
    /// Photo to annotate.
    image: PathBuf,

    /// Recorded session (JSON) with pointer events and commands.
    #[arg(short, long, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Folder for baked images. Overrides the settings file.
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Settings file. Defaults to the one next to the executable.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Write the final on-screen view as a PNG.
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    let settings_path = match &args.settings {
        Some(path) => path.clone(),
        None => resolve_settings_path()?,
    };
    let settings = MarkupSettings::load(&settings_path)?;
    photo_markup::logging::init(
        args.debug || settings.debug_logging,
        settings.log_file.clone(),
    );

    let output_dir = resolve_output_folder(args.out.as_deref().or(settings.export_dir.as_deref()))?;
    let sink = PngFileSink::new(output_dir, settings.export_prefix.clone());

    let mut surface = DrawingSurface::new();
    surface.set_viewport(settings.viewport.0, settings.viewport.1);
    surface
        .load_from(&FileImageSource::new(&args.image))
        .with_context(|| format!("load {}", args.image.display()))?;

    let mut controller = MarkupController::new(surface, sink);
    let session = match &args.session {
        Some(path) => MarkupSession::load(path)?,
        None => MarkupSession::default(),
    };

    for feedback in replay(&mut controller, &session) {
        if feedback.is_error() {
            eprintln!("{}", feedback.message());
        } else {
            println!("{}", feedback.message());
        }
    }

    if let Some(preview) = &args.preview {
        controller
            .surface()
            .render_frame()
            .save(preview)
            .with_context(|| format!("write preview {}", preview.display()))?;
    }
    Ok(())
}
