//! Progress and outcome types reported by an organizer run.
//!
//! A run produces zero or more progress percentages followed by exactly one
//! [`RunOutcome`]. The engine reports progress through a [`RunObserver`]
//! supplied by the caller, so it stays independent of any terminal or UI code.

use crate::scanner::ExtensionKey;
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Per-extension file counts for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<ExtensionKey, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &ExtensionKey) {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
    }

    /// Returns the count for `key`, or 0 if no file had that extension.
    pub fn get(&self, key: &str) -> usize {
        self.counts
            .get(&ExtensionKey::from(key))
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct extension keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of files across all keys.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Entries ordered by key, for display.
    pub fn sorted(&self) -> Vec<(&ExtensionKey, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Terminal result of a run. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// All files were processed.
    Success(Tally),
    /// The run stopped; the message is meant to be shown verbatim.
    Failure(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    /// Converts into a `Result`, handy for `?` at the CLI layer.
    pub fn into_result(self) -> Result<Tally, String> {
        match self {
            RunOutcome::Success(tally) => Ok(tally),
            RunOutcome::Failure(message) => Err(message),
        }
    }
}

/// A message on the worker's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Percent of files processed so far, 0 to 100.
    Progress(u8),
    /// Always the last event of a run.
    Finished(RunOutcome),
}

/// Receives progress notifications while a run is in flight.
pub trait RunObserver {
    fn on_progress(&mut self, percent: u8);
}

/// Observer that ignores every notification.
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_progress(&mut self, _percent: u8) {}
}

/// Collects progress values in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<u8>,
}

impl RunObserver for RecordingObserver {
    fn on_progress(&mut self, percent: u8) {
        self.events.push(percent);
    }
}

/// Forwards progress onto an mpsc channel.
///
/// A disconnected receiver is ignored: the run carries on and the outcome is
/// still returned to whoever drives the engine.
pub struct ChannelObserver {
    sender: Sender<RunEvent>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<RunEvent>) -> Self {
        Self { sender }
    }
}

impl RunObserver for ChannelObserver {
    fn on_progress(&mut self, percent: u8) {
        let _ = self.sender.send(RunEvent::Progress(percent));
    }
}

impl<F: FnMut(u8)> RunObserver for F {
    fn on_progress(&mut self, percent: u8) {
        self(percent)
    }
}

/// Percentage of `processed` out of `total`, rounded down.
///
/// Reaches exactly 100 when `processed == total`.
pub fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed.min(total) * 100) / total) as u8
}
