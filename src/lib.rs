//! tidyext - sort the files of a directory into per-extension subfolders.
//!
//! The library scans a directory, groups its regular files by normalized
//! extension and either previews the result or moves every file into a
//! subfolder named after its extension, renaming on collision. Runs execute
//! on a worker thread and report progress over a channel.

pub mod cli;
pub mod config;
pub mod events;
pub mod organizer;
pub mod output;
pub mod scanner;
pub mod worker;

pub use config::{Config, ConfigError};
pub use events::{RunEvent, RunObserver, RunOutcome, Tally};
pub use organizer::{Mode, MovePlan, OrganizeError, Organizer, RunState};
pub use scanner::{DirectoryEntry, ExtensionKey, scan};
pub use worker::{RunHandle, spawn_run};

pub use cli::run_cli;
