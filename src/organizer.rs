/// Organizer engine: moves files into per-extension subdirectories.
///
/// One [`Organizer`] drives a single run through scanning and processing.
/// Preview and commit share the same pipeline; commit additionally creates
/// the extension directories and moves each file, renaming on collision.
use crate::events::{RunObserver, RunOutcome, Tally, progress_percent};
use crate::scanner::{DirectoryEntry, ExtensionKey, scan};
use log::{debug, info, warn};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Whether a run only counts files or also moves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Count files per extension without touching the filesystem.
    Preview,
    /// Create extension directories and move files into them.
    Commit,
}

impl Mode {
    /// Verb used in failure messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Preview => "previewing",
            Mode::Commit => "organizing",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Preview => f.write_str("preview"),
            Mode::Commit => f.write_str("commit"),
        }
    }
}

/// Lifecycle of a single run. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    Processing,
    Completed,
    Failed,
}

/// Errors that can stop an organizer run.
#[derive(Debug)]
pub enum OrganizeError {
    /// No non-hidden regular files were found.
    EmptyDirectory { path: PathBuf },
    /// The source path is missing or is not a directory.
    InvalidBasePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The directory listing could not be read.
    ReadDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create an extension directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its extension directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Anything else, including a panic inside the engine.
    Unexpected(String),
}

impl fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDirectory { .. } => {
                write!(f, "No files found in the selected directory.")
            }
            Self::InvalidBasePath { path, source } => {
                write!(f, "Invalid base path {}: {}", path.display(), source)
            }
            Self::ReadDirectory { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::Unexpected(reason) => write!(f, "Unexpected error: {}", reason),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBasePath { source, .. }
            | Self::ReadDirectory { source, .. }
            | Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            Self::EmptyDirectory { .. } | Self::Unexpected(_) => None,
        }
    }
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// A resolved move for one file.
///
/// `destination` did not exist at the moment the plan was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl MovePlan {
    /// Plans the move of `entry` into `extension_dir`.
    ///
    /// Keeps the original name when it is free, otherwise tries
    /// `{base}_1{ext}`, `{base}_2{ext}`, ... where base and ext come from the
    /// original file name, not from the normalized key.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyext::organizer::MovePlan;
    /// use tidyext::scanner::DirectoryEntry;
    /// use std::path::Path;
    ///
    /// let entry = DirectoryEntry::new("Report.TXT".into());
    /// let plan = MovePlan::resolve(Path::new("/downloads"), Path::new("/downloads/txt"), &entry);
    /// println!("{} -> {}", plan.source.display(), plan.destination.display());
    /// ```
    pub fn resolve(source_dir: &Path, extension_dir: &Path, entry: &DirectoryEntry) -> Self {
        let mut destination = extension_dir.join(&entry.name);
        let mut counter = 1u64;
        while is_taken(&destination) {
            destination = extension_dir.join(collision_name(&entry.name, counter));
            counter += 1;
        }

        Self {
            source: source_dir.join(&entry.name),
            destination,
        }
    }

    /// Performs the move.
    pub fn execute(&self) -> OrganizeResult<()> {
        fs::rename(&self.source, &self.destination).map_err(|e| OrganizeError::FileMoveFailure {
            source: self.source.clone(),
            destination: self.destination.clone(),
            source_error: e,
        })
    }
}

/// Builds `{base}_{counter}{ext}` from the original file name.
///
/// The split happens at the last `.`, so `Report.TXT` becomes `Report_1.TXT`
/// and `README` becomes `README_1`.
pub fn collision_name(file_name: &OsStr, counter: u64) -> OsString {
    let path = Path::new(file_name);
    let mut name = path.file_stem().unwrap_or(file_name).to_os_string();
    name.push(format!("_{}", counter));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Creates `source_dir/key` if it is not already there and returns its path.
pub fn ensure_extension_dir(source_dir: &Path, key: &ExtensionKey) -> OrganizeResult<PathBuf> {
    let extension_dir = source_dir.join(key.as_str());
    fs::create_dir_all(&extension_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
        path: extension_dir.clone(),
        source: e,
    })?;
    Ok(extension_dir)
}

/// Drives one organizer run.
///
/// An instance is single-use: once it reaches a terminal state, calling
/// [`Organizer::run`] again reports a failure without touching the filesystem.
pub struct Organizer {
    source_dir: PathBuf,
    mode: Mode,
    state: RunState,
}

impl Organizer {
    pub fn new(source_dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            source_dir: source_dir.into(),
            mode,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs the scan and processes every file, reporting progress to `observer`.
    ///
    /// Never panics and never returns an error: every failure, including a
    /// panic in the processing loop, is turned into [`RunOutcome::Failure`].
    /// Files already moved before a commit failure stay where they were moved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidyext::events::{NoopObserver, RunOutcome};
    /// use tidyext::organizer::{Mode, Organizer};
    ///
    /// let mut organizer = Organizer::new("/path/to/downloads", Mode::Preview);
    /// match organizer.run(&mut NoopObserver) {
    ///     RunOutcome::Success(tally) => println!("{} files", tally.total()),
    ///     RunOutcome::Failure(message) => eprintln!("{}", message),
    /// }
    /// ```
    pub fn run(&mut self, observer: &mut dyn RunObserver) -> RunOutcome {
        if self.state != RunState::Idle {
            return RunOutcome::Failure(format!(
                "Error {} files: this organizer has already run",
                self.mode.verb()
            ));
        }

        info!(
            "starting {} run in {}",
            self.mode,
            self.source_dir.display()
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.process(observer)));
        let error = match result {
            Ok(Ok(tally)) => {
                self.transition(RunState::Completed);
                info!("{} run finished: {} files", self.mode, tally.total());
                return RunOutcome::Success(tally);
            }
            Ok(Err(e)) => e,
            Err(payload) => OrganizeError::Unexpected(panic_message(payload.as_ref())),
        };

        self.transition(RunState::Failed);
        warn!("{} run failed: {}", self.mode, error);
        RunOutcome::Failure(self.failure_message(&error))
    }

    fn process(&mut self, observer: &mut dyn RunObserver) -> OrganizeResult<Tally> {
        self.transition(RunState::Scanning);
        let entries = scan(&self.source_dir)?;

        self.transition(RunState::Processing);
        let total = entries.len();
        let mut tally = Tally::new();

        for (index, entry) in entries.iter().enumerate() {
            tally.increment(&entry.key);

            if self.mode == Mode::Commit {
                let extension_dir = ensure_extension_dir(&self.source_dir, &entry.key)?;
                let plan = MovePlan::resolve(&self.source_dir, &extension_dir, entry);
                debug!(
                    "moving {} -> {}",
                    plan.source.display(),
                    plan.destination.display()
                );
                plan.execute()?;
            }

            observer.on_progress(progress_percent(index + 1, total));
        }

        Ok(tally)
    }

    fn transition(&mut self, next: RunState) {
        debug!("organizer state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn failure_message(&self, error: &OrganizeError) -> String {
        match error {
            OrganizeError::EmptyDirectory { .. } => error.to_string(),
            _ => format!("Error {} files: {}", self.mode.verb(), error),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
