//! Integration tests for tidyext
//!
//! These tests run the organizer end to end against temporary directories.
//!
//! Test categories:
//! 1. Preview mode
//! 2. Commit mode
//! 3. Collisions and case handling
//! 4. Hidden and extension-less files
//! 5. Progress reporting
//! 6. Configuration and error scenarios

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use tidyext::cli::run_cli_with_config;
use tidyext::config::Config;
use tidyext::events::{RecordingObserver, RunEvent, RunOutcome, Tally};
use tidyext::organizer::{Mode, Organizer};
use tidyext::worker::spawn_run;

// ============================================================================
// Test Utilities
// ============================================================================

const EMPTY_MESSAGE: &str = "No files found in the selected directory.";

/// A temporary source directory with helpers for building fixtures.
struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        TestFixture { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn create_file(&self, rel_path: &str, content: &str) {
        let file_path = self.path().join(rel_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        let mut file = File::create(&file_path).expect("Failed to create file");
        file.write_all(content.as_bytes())
            .expect("Failed to write file content");
    }

    fn create_files(&self, names: &[&str]) {
        for name in names {
            self.create_file(name, name);
        }
    }

    fn read(&self, rel_path: &str) -> String {
        fs::read_to_string(self.path().join(rel_path)).expect("Failed to read file")
    }

    fn assert_dir_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_dir(), "Directory should exist: {}", path.display());
    }

    fn assert_file_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    fn assert_file_not_exists(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "File should not exist: {}", path.display());
    }

    /// Names of the regular files directly inside `rel_dir`.
    fn files_in(&self, rel_dir: &str) -> BTreeSet<String> {
        fs::read_dir(self.path().join(rel_dir))
            .expect("Failed to read directory")
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect()
    }

    /// Names of the subdirectories directly inside the fixture root.
    fn dirs(&self) -> BTreeSet<String> {
        fs::read_dir(self.path())
            .expect("Failed to read directory")
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect()
    }

    /// Every entry under the root, recursively, as relative paths.
    fn snapshot(&self) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        Self::walk(self.path(), self.path(), &mut paths);
        paths
    }

    fn walk(root: &Path, dir: &Path, paths: &mut BTreeSet<String>) {
        for entry in fs::read_dir(dir).expect("Failed to read directory").flatten() {
            let path = entry.path();
            let rel = path
                .strip_prefix(root)
                .expect("entry under root")
                .to_string_lossy()
                .to_string();
            paths.insert(rel);
            if path.is_dir() {
                Self::walk(root, &path, paths);
            }
        }
    }

    /// Adds a subdirectory holding one file, which scans must ignore.
    fn create_subdir_with_file(&self) {
        self.create_file("archive/old.txt", "old");
    }

    fn run(&self, mode: Mode) -> (Vec<u8>, RunOutcome) {
        run_in(self.path(), mode)
    }

    fn run_ok(&self, mode: Mode) -> Tally {
        let (_, outcome) = self.run(mode);
        outcome.into_result().expect("run should succeed")
    }
}

fn run_in(dir: &Path, mode: Mode) -> (Vec<u8>, RunOutcome) {
    let mut organizer = Organizer::new(dir, mode);
    let mut observer = RecordingObserver::default();
    let outcome = organizer.run(&mut observer);
    (observer.events, outcome)
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Five files spanning four extension keys.
const MIXED_FILES: &[&str] = &["notes.txt", "todo.txt", "photo.jpg", "song.mp3", "README"];

// ============================================================================
// Test Suite 1: Preview Mode
// ============================================================================

#[test]
fn test_preview_counts_without_mutation() {
    let fixture = TestFixture::new();
    fixture.create_files(MIXED_FILES);
    fixture.create_subdir_with_file();
    let before = fixture.snapshot();

    let tally = fixture.run_ok(Mode::Preview);

    assert_eq!(tally.len(), 4);
    assert_eq!(tally.total(), 5);
    assert_eq!(tally.get("txt"), 2);
    assert_eq!(tally.get("jpg"), 1);
    assert_eq!(tally.get("mp3"), 1);
    assert_eq!(tally.get("no_extension"), 1);
    assert_eq!(fixture.snapshot(), before, "Preview must not touch the filesystem");
}

#[test]
fn test_preview_then_commit_report_same_tally() {
    let fixture = TestFixture::new();
    fixture.create_files(MIXED_FILES);

    let preview = fixture.run_ok(Mode::Preview);
    let commit = fixture.run_ok(Mode::Commit);

    assert_eq!(preview, commit);
}

// ============================================================================
// Test Suite 2: Commit Mode
// ============================================================================

#[test]
fn test_commit_moves_every_file_into_its_key_dir() {
    let fixture = TestFixture::new();
    fixture.create_files(MIXED_FILES);

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.total(), MIXED_FILES.len());
    assert_eq!(fixture.dirs(), names(&["jpg", "mp3", "no_extension", "txt"]));
    assert_eq!(fixture.files_in("txt"), names(&["notes.txt", "todo.txt"]));
    fixture.assert_file_exists("jpg/photo.jpg");
    fixture.assert_file_exists("mp3/song.mp3");
    assert!(fixture.files_in(".").is_empty(), "Root should hold no files");
}

#[test]
fn test_commit_uses_existing_extension_dir() {
    let fixture = TestFixture::new();
    fixture.create_file("pdf/old.pdf", "old");
    fixture.create_file("new.pdf", "new");

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.total(), 1);
    fixture.assert_file_exists("pdf/old.pdf");
    fixture.assert_file_exists("pdf/new.pdf");
    fixture.assert_file_not_exists("new.pdf");
}

#[test]
fn test_commit_leaves_subdirectories_alone() {
    let fixture = TestFixture::new();
    fixture.create_file("nested/inner.txt", "inner");
    fixture.create_file("outer.txt", "outer");

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.total(), 1);
    fixture.assert_file_exists("nested/inner.txt");
    fixture.assert_file_exists("txt/outer.txt");
}

#[test]
fn test_commit_twice_reports_empty_directory() {
    let fixture = TestFixture::new();
    fixture.create_files(&["a.txt"]);

    fixture.run_ok(Mode::Commit);
    let (events, outcome) = fixture.run(Mode::Commit);

    assert!(events.is_empty());
    assert_eq!(outcome, RunOutcome::Failure(EMPTY_MESSAGE.to_string()));
}

// ============================================================================
// Test Suite 3: Collisions and Case Handling
// ============================================================================

#[test]
fn test_collision_gets_numbered_suffix() {
    let fixture = TestFixture::new();
    fixture.create_file("txt/report.txt", "existing");
    fixture.create_file("report.txt", "incoming");

    fixture.run_ok(Mode::Commit);

    assert_eq!(fixture.read("txt/report.txt"), "existing");
    assert_eq!(fixture.read("txt/report_1.txt"), "incoming");
    fixture.assert_file_not_exists("report.txt");
}

#[test]
fn test_collision_counter_skips_taken_slots() {
    let fixture = TestFixture::new();
    fixture.create_file("txt/report.txt", "first");
    fixture.create_file("txt/report_1.txt", "second");
    fixture.create_file("report.txt", "third");

    fixture.run_ok(Mode::Commit);

    assert_eq!(fixture.read("txt/report_2.txt"), "third");
    assert_eq!(fixture.read("txt/report_1.txt"), "second");
}

#[test]
fn test_case_is_normalized_for_dir_but_kept_in_name() {
    let fixture = TestFixture::new();
    fixture.create_files(&["A.TXT", "b.txt"]);

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.len(), 1);
    assert_eq!(tally.get("txt"), 2);
    fixture.assert_file_exists("txt/A.TXT");
    fixture.assert_file_exists("txt/b.txt");
}

#[test]
fn test_collision_name_keeps_original_extension_casing() {
    let fixture = TestFixture::new();
    fixture.create_file("txt/Report.TXT", "existing");
    fixture.create_file("Report.TXT", "incoming");

    fixture.run_ok(Mode::Commit);

    assert_eq!(fixture.read("txt/Report_1.TXT"), "incoming");
}

// ============================================================================
// Test Suite 4: Hidden and Extension-less Files
// ============================================================================

#[test]
fn test_hidden_files_are_ignored() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".secret", "visible.md"]);

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.total(), 1);
    fixture.assert_file_exists(".secret");
    fixture.assert_file_exists("md/visible.md");
    assert!(!fixture.path().join("secret").exists());
    assert!(!fixture.path().join("no_extension").exists());
}

#[test]
fn test_only_hidden_files_is_empty_failure() {
    let fixture = TestFixture::new();
    fixture.create_files(&[".DS_Store", ".env"]);

    let (events, outcome) = fixture.run(Mode::Preview);

    assert!(events.is_empty(), "No progress should be reported");
    assert_eq!(outcome, RunOutcome::Failure(EMPTY_MESSAGE.to_string()));
}

#[test]
fn test_empty_directory_is_failure_in_both_modes() {
    let fixture = TestFixture::new();

    for mode in [Mode::Preview, Mode::Commit] {
        let (events, outcome) = fixture.run(mode);
        assert!(events.is_empty());
        assert_eq!(outcome, RunOutcome::Failure(EMPTY_MESSAGE.to_string()));
    }
    assert!(fixture.dirs().is_empty());
}

#[test]
fn test_file_without_extension() {
    let fixture = TestFixture::new();
    fixture.create_files(&["README"]);

    let tally = fixture.run_ok(Mode::Commit);

    assert_eq!(tally.get("no_extension"), 1);
    fixture.assert_dir_exists("no_extension");
    fixture.assert_file_exists("no_extension/README");
}

// ============================================================================
// Test Suite 5: Progress Reporting
// ============================================================================

#[test]
fn test_progress_is_monotonic_and_ends_at_100() {
    let fixture = TestFixture::new();
    for i in 0..7 {
        fixture.create_file(&format!("file_{}.dat", i), "x");
    }

    for mode in [Mode::Preview, Mode::Commit] {
        let (events, outcome) = fixture.run(mode);
        assert!(outcome.is_success());
        assert_eq!(events.len(), 7);
        assert!(events.windows(2).all(|w| w[0] <= w[1]), "{:?}", events);
        assert_eq!(events.last(), Some(&100));
    }
}

#[test]
fn test_worker_stream_ends_with_one_outcome() {
    let fixture = TestFixture::new();
    fixture.create_files(MIXED_FILES);

    let events: Vec<RunEvent> = spawn_run(Organizer::new(fixture.path(), Mode::Commit)).collect();

    let finished = events
        .iter()
        .filter(|e| matches!(e, RunEvent::Finished(_)))
        .count();
    assert_eq!(finished, 1);
    assert!(matches!(
        events.last(),
        Some(RunEvent::Finished(RunOutcome::Success(_)))
    ));
    assert_eq!(
        events.get(events.len() - 2),
        Some(&RunEvent::Progress(100))
    );
}

// ============================================================================
// Test Suite 6: Configuration and Error Scenarios
// ============================================================================

#[test]
fn test_config_never_changes_the_tally() {
    let fixture = TestFixture::new();
    fixture.create_files(&["keep.tmp", "Thumbs.db", "move.txt"]);
    let config = Config::parse(
        r#"
        [filters.exclude]
        filenames = ["Thumbs.db"]
        extensions = ["tmp"]

        [output]
        progress_bar = false
        color = false
        "#,
    )
    .expect("valid config");

    let tally = run_cli_with_config(Mode::Commit, fixture.path(), config).expect("run succeeds");

    assert_eq!(tally.total(), 3);
    fixture.assert_file_exists("tmp/keep.tmp");
    fixture.assert_file_exists("db/Thumbs.db");
    fixture.assert_file_exists("txt/move.txt");
}

#[test]
fn test_cli_reports_failure_message_verbatim() {
    let fixture = TestFixture::new();
    let mut config = Config::default();
    config.output.progress_bar = false;

    let result = run_cli_with_config(Mode::Preview, fixture.path(), config);

    assert_eq!(result, Err(EMPTY_MESSAGE.to_string()));
}

#[test]
fn test_missing_directory_fails_with_phase() {
    let fixture = TestFixture::new();
    let missing = fixture.path().join("does-not-exist");

    let (events, outcome) = run_in(&missing, Mode::Commit);

    assert!(events.is_empty());
    match outcome {
        RunOutcome::Failure(message) => {
            assert!(message.starts_with("Error organizing files:"), "{}", message);
            assert_ne!(message, EMPTY_MESSAGE);
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_blocked_extension_dir_fails_and_keeps_file() {
    let fixture = TestFixture::new();
    // A symlink named "zip" is skipped by the scan but blocks creating zip/.
    fixture.create_file(".target", "hidden target");
    std::os::unix::fs::symlink(fixture.path().join(".target"), fixture.path().join("zip"))
        .expect("Failed to create symlink");
    fixture.create_files(&["a.zip"]);

    let (events, outcome) = fixture.run(Mode::Commit);

    assert!(events.is_empty());
    match outcome {
        RunOutcome::Failure(message) => {
            assert!(message.starts_with("Error organizing files:"), "{}", message)
        }
        other => panic!("expected failure, got {:?}", other),
    }
    fixture.assert_file_exists("a.zip");
}

#[cfg(unix)]
#[test]
fn test_failure_midway_keeps_earlier_moves() {
    let fixture = TestFixture::new();
    fixture.create_file(".target", "hidden target");
    std::os::unix::fs::symlink(fixture.path().join(".target"), fixture.path().join("zip"))
        .expect("Failed to create symlink");
    fixture.create_files(&["a.txt", "b.txt", "c.txt", "z.zip"]);

    let (events, outcome) = fixture.run(Mode::Commit);

    assert!(
        matches!(outcome, RunOutcome::Failure(_)),
        "expected failure, got {:?}",
        outcome
    );
    let moved = if fixture.path().join("txt").is_dir() {
        fixture.files_in("txt")
    } else {
        BTreeSet::new()
    };
    // Every file that reported progress was moved, and stays moved.
    assert_eq!(events.len(), moved.len());
    let left_at_root = fixture.files_in(".");
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(
            moved.contains(name) != left_at_root.contains(name),
            "{} should be in exactly one place",
            name
        );
    }
    fixture.assert_file_exists("z.zip");
}
