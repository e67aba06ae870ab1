//! Directory scanning and extension classification.
//!
//! A scan lists the regular files directly inside a directory, drops hidden
//! files, and tags every remaining file with its [`ExtensionKey`].

use crate::organizer::{OrganizeError, OrganizeResult};
use log::debug;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::Path;

/// Normalized, lowercase file extension used to group files.
///
/// Files without a usable suffix share the [`ExtensionKey::NO_EXTENSION`] key.
///
/// # Examples
///
/// ```
/// use tidyext::scanner::ExtensionKey;
/// use std::ffi::OsStr;
///
/// assert_eq!(ExtensionKey::from_file_name(OsStr::new("Report.TXT")).as_str(), "txt");
/// assert_eq!(ExtensionKey::from_file_name(OsStr::new("README")).as_str(), "no_extension");
/// assert_eq!(ExtensionKey::from_file_name(OsStr::new("notes.")).as_str(), "no_extension");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionKey(String);

impl ExtensionKey {
    /// Sentinel key for files with no suffix after their last `.`.
    pub const NO_EXTENSION: &'static str = "no_extension";

    /// Derives the key from a bare file name.
    ///
    /// Non-UTF-8 bytes in the extension are replaced with U+FFFD, so such
    /// extensions may share a key and therefore a folder.
    pub fn from_file_name(name: &OsStr) -> Self {
        match Path::new(name).extension() {
            Some(ext) if !ext.is_empty() => Self(ext.to_string_lossy().to_lowercase()),
            _ => Self(Self::NO_EXTENSION.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_no_extension(&self) -> bool {
        self.0 == Self::NO_EXTENSION
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionKey {
    fn from(value: &str) -> Self {
        Self(value.to_lowercase())
    }
}

/// A regular file found directly inside the scanned directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// The file name, exactly as stored on disk.
    pub name: OsString,
    /// The normalized grouping key.
    pub key: ExtensionKey,
}

impl DirectoryEntry {
    pub fn new(name: OsString) -> Self {
        let key = ExtensionKey::from_file_name(&name);
        Self { name, key }
    }

    /// Returns true when the name follows the dot-file convention.
    pub fn is_hidden_name(name: &OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }
}

/// Lists the non-hidden regular files of `source_dir` in enumeration order.
///
/// Subdirectories, symbolic links and other special entries are skipped.
///
/// # Errors
///
/// * [`OrganizeError::InvalidBasePath`] if `source_dir` is missing or not a directory
/// * [`OrganizeError::ReadDirectory`] if the listing cannot be read
/// * [`OrganizeError::EmptyDirectory`] if no qualifying file remains
pub fn scan(source_dir: &Path) -> OrganizeResult<Vec<DirectoryEntry>> {
    let metadata = fs::metadata(source_dir).map_err(|e| OrganizeError::InvalidBasePath {
        path: source_dir.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_dir() {
        return Err(OrganizeError::InvalidBasePath {
            path: source_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let read_err = |e: std::io::Error| OrganizeError::ReadDirectory {
        path: source_dir.to_path_buf(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let is_file = entry.file_type().map_err(read_err)?.is_file();
        if !is_file {
            continue;
        }

        let name = entry.file_name();
        if DirectoryEntry::is_hidden_name(&name) {
            debug!("skipping hidden file {:?}", name);
            continue;
        }

        entries.push(DirectoryEntry::new(name));
    }

    if entries.is_empty() {
        return Err(OrganizeError::EmptyDirectory {
            path: source_dir.to_path_buf(),
        });
    }

    debug!(
        "scanned {} qualifying files in {}",
        entries.len(),
        source_dir.display()
    );
    Ok(entries)
}
