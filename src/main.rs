//! Quill - a terminal text editor
//!
//! Usage: `quill [FILE] [--config PATH]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use quill::app::{logging, Config};
use quill::terminal::{self, RawMode, TtyInput, TtyOutput};
use quill::{Editor, EditorResult};

/// A small terminal text editor
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// File to edit (created on first save if missing)
    file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/quill/config.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (config, ignored) = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => (config, None),
            Err(e) => {
                eprintln!("quill: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };

    if let Err(e) = logging::init(&config.log_path()) {
        eprintln!("quill: logging disabled: {}", e);
    }

    if let Some(e) = ignored {
        let path = Config::default_path().unwrap_or_default();
        tracing::warn!("ignoring {}: {}", path.display(), e);
        eprintln!("quill: ignoring {}: {}", path.display(), e);
    }

    tracing::info!("Quill starting");

    match run(args.file, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            eprintln!("quill: {}", e);
            ExitCode::FAILURE
        },
    }
}

/// Every exit from the editing session passes through here: the screen is
/// cleared and the terminal restored whether the session ended by quitting
/// or by an error.
fn run(file: Option<PathBuf>, config: &Config) -> EditorResult<()> {
    let mut raw = RawMode::enter()?;

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        terminal::restore_saved_mode();
        default_hook(info);
    }));

    let result = session(file, config);

    let cleared = terminal::clear_screen(&mut TtyOutput::stdout());
    raw.restore()?;
    result?;
    cleared?;
    Ok(())
}

fn session(file: Option<PathBuf>, config: &Config) -> EditorResult<()> {
    let mut input = TtyInput;
    let mut output = TtyOutput::stdout();
    let size = terminal::query_window_size(&mut input, &mut output)?;
    tracing::debug!("window size {}x{}", size.cols, size.rows);

    let mut editor = Editor::new(input, output, size, config);
    if let Some(path) = file {
        editor.open(path)?;
    }

    editor.run()
}
