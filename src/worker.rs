//! Background execution of an organizer run.
//!
//! [`spawn_run`] moves an [`Organizer`] onto its own thread and streams
//! [`RunEvent`]s back over an ordered channel: progress values first, then a
//! single [`RunEvent::Finished`]. A run cannot be cancelled once started.

use crate::events::{ChannelObserver, RunEvent, RunOutcome};
use crate::organizer::{Mode, Organizer};
use log::{debug, warn};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Handle to a run executing on a worker thread.
pub struct RunHandle {
    mode: Mode,
    receiver: Receiver<RunEvent>,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl RunHandle {
    /// Blocks until the next event arrives.
    ///
    /// Returns `None` after the terminal event has been delivered. If the
    /// worker dies without reporting, a synthetic failure is returned so the
    /// caller still sees exactly one terminal event.
    pub fn next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }

        let event = match self.receiver.recv() {
            Ok(event) => event,
            Err(_) => {
                warn!("worker exited without reporting an outcome");
                RunEvent::Finished(RunOutcome::Failure(format!(
                    "Error {} files: worker stopped unexpectedly",
                    self.mode.verb()
                )))
            }
        };

        if let RunEvent::Finished(_) = event {
            self.finished = true;
            self.join();
        }
        Some(event)
    }

    /// Drains remaining events, calling `on_progress` for each percentage, and
    /// returns the outcome.
    pub fn wait_with_progress(mut self, mut on_progress: impl FnMut(u8)) -> RunOutcome {
        while let Some(event) = self.next_event() {
            match event {
                RunEvent::Progress(percent) => on_progress(percent),
                RunEvent::Finished(outcome) => return outcome,
            }
        }
        RunOutcome::Failure(format!(
            "Error {} files: outcome already consumed",
            self.mode.verb()
        ))
    }

    /// Blocks until the run finishes and returns its outcome.
    pub fn wait(self) -> RunOutcome {
        self.wait_with_progress(|_| {})
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take()
            && handle.join().is_err()
        {
            warn!("worker thread panicked after reporting");
        }
    }
}

impl Iterator for RunHandle {
    type Item = RunEvent;

    fn next(&mut self) -> Option<RunEvent> {
        self.next_event()
    }
}

/// Starts `organizer` on a dedicated thread.
///
/// # Examples
///
/// ```no_run
/// use tidyext::events::RunEvent;
/// use tidyext::organizer::{Mode, Organizer};
/// use tidyext::worker::spawn_run;
///
/// let handle = spawn_run(Organizer::new("/path/to/downloads", Mode::Commit));
/// for event in handle {
///     match event {
///         RunEvent::Progress(percent) => println!("{}%", percent),
///         RunEvent::Finished(outcome) => println!("{:?}", outcome),
///     }
/// }
/// ```
pub fn spawn_run(mut organizer: Organizer) -> RunHandle {
    let mode = organizer.mode();
    let (sender, receiver) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("tidyext-worker".to_string())
        .spawn({
            let sender = sender.clone();
            move || {
                let mut observer = ChannelObserver::new(sender.clone());
                let outcome = organizer.run(&mut observer);
                debug!("worker finished, reporting outcome");
                let _ = sender.send(RunEvent::Finished(outcome));
            }
        });

    let thread = match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("failed to spawn worker thread: {}", e);
            let _ = sender.send(RunEvent::Finished(RunOutcome::Failure(format!(
                "Error {} files: could not start worker: {}",
                mode.verb(),
                e
            ))));
            None
        }
    };

    RunHandle {
        mode,
        receiver,
        thread,
        finished: false,
    }
}
