//! Terminal output: colored status lines, the run progress bar and the
//! per-extension summary.

use crate::events::Tally;
use crate::organizer::Mode;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Centralizes all CLI output so styling stays consistent.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Turns colored output on or off for the whole process.
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Creates a percentage progress bar for a run.
    ///
    /// Returns a hidden bar when `visible` is false so callers can drive it
    /// unconditionally.
    pub fn create_progress_bar(visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(100);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Summary lines for a completed run, keys sorted.
    ///
    /// # Example
    ///
    /// ```
    /// use tidyext::events::Tally;
    /// use tidyext::organizer::Mode;
    /// use tidyext::output::OutputFormatter;
    /// use tidyext::scanner::ExtensionKey;
    ///
    /// let mut tally = Tally::new();
    /// tally.increment(&ExtensionKey::from("txt"));
    /// let lines = OutputFormatter::summary_lines(&tally, Mode::Commit);
    /// assert_eq!(lines, vec!["Total files organized: 1", "txt: 1 files"]);
    /// ```
    pub fn summary_lines(tally: &Tally, mode: Mode) -> Vec<String> {
        let mut lines = Vec::with_capacity(tally.len() + 1);
        match mode {
            Mode::Preview => lines.push(format!(
                "PREVIEW: Total files that would be organized: {}",
                tally.total()
            )),
            Mode::Commit => lines.push(format!("Total files organized: {}", tally.total())),
        }

        for (key, count) in tally.sorted() {
            match mode {
                Mode::Preview => lines.push(format!("{}: {} files would be moved", key, count)),
                Mode::Commit => lines.push(format!("{}: {} files", key, count)),
            }
        }
        lines
    }

    /// Prints the summary followed by a closing status line.
    pub fn print_summary(tally: &Tally, mode: Mode) {
        Self::header("SUMMARY");
        let mut lines = Self::summary_lines(tally, mode).into_iter();
        if let Some(total) = lines.next() {
            println!("{}", total.bold());
        }
        for line in lines {
            println!("  {}", line);
        }

        match mode {
            Mode::Preview => Self::dry_run_notice(
                "Preview completed! Run again without --dry-run to perform the organization.",
            ),
            Mode::Commit => Self::success("Organization completed!"),
        }
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
