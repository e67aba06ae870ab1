//! Command-line interface for tidyext.
//!
//! Parses arguments, loads configuration, runs the organizer on a worker
//! thread and renders its progress and summary.

use crate::config::Config;
use crate::events::{RunEvent, RunOutcome, Tally};
use crate::organizer::{Mode, Organizer};
use crate::output::OutputFormatter;
use crate::worker::spawn_run;
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

/// Sort the files of a directory into subfolders named after their extension.
#[derive(Debug, Parser)]
#[command(name = "tidyext", version, about, long_about = None)]
pub struct Args {
    /// Directory whose files should be organized
    pub directory: PathBuf,

    /// Only count what would be moved, without touching any file
    #[arg(short = 'n', long = "dry-run", alias = "preview")]
    pub dry_run: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.dry_run {
            Mode::Preview
        } else {
            Mode::Commit
        }
    }
}

/// Runs a preview or commit over `dir_path` and prints the result.
///
/// Returns the tally on success, or the failure message exactly as the
/// organizer reported it.
///
/// # Examples
///
/// ```no_run
/// use tidyext::cli::run_cli;
/// use tidyext::organizer::Mode;
/// use std::path::Path;
///
/// match run_cli(Mode::Preview, Path::new("/path/to/directory"), None) {
///     Ok(tally) => println!("{} files", tally.total()),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
pub fn run_cli(mode: Mode, dir_path: &Path, config_path: Option<&Path>) -> Result<Tally, String> {
    let config =
        Config::load(config_path).map_err(|e| format!("Error loading configuration: {}", e))?;
    run_cli_with_config(mode, dir_path, config)
}

/// Runs the CLI from parsed arguments, honoring `--no-progress`.
pub fn run_with_args(args: &Args) -> Result<Tally, String> {
    let mut config = Config::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    if args.no_progress {
        config.output.progress_bar = false;
    }
    run_cli_with_config(args.mode(), &args.directory, config)
}

/// Same as [`run_cli`] with an already loaded configuration.
pub fn run_cli_with_config(mode: Mode, dir_path: &Path, config: Config) -> Result<Tally, String> {
    OutputFormatter::set_color(config.output.color);
    match mode {
        Mode::Preview => OutputFormatter::info(&format!(
            "Previewing organization of: {}",
            dir_path.display()
        )),
        Mode::Commit => {
            OutputFormatter::info(&format!("Organizing files in: {}", dir_path.display()))
        }
    }

    let organizer = Organizer::new(dir_path, mode);
    let progress = OutputFormatter::create_progress_bar(config.output.progress_bar);

    let mut outcome = None;
    for event in spawn_run(organizer) {
        match event {
            RunEvent::Progress(percent) => progress.set_position(u64::from(percent)),
            RunEvent::Finished(result) => outcome = Some(result),
        }
    }
    progress.finish_and_clear();

    match outcome {
        Some(RunOutcome::Success(tally)) => {
            info!("{} run reported {} files", mode, tally.total());
            OutputFormatter::print_summary(&tally, mode);
            Ok(tally)
        }
        Some(RunOutcome::Failure(message)) => Err(message),
        None => Err(format!("Error {} files: no outcome reported", mode.verb())),
    }
}
