//! Label storage: mutable named pointers to hashes.
//!
//! Labels are the only garbage-collection roots. Each label is a file under
//! `<root>/labels/<name>` containing the hex digest of its target.

use crate::error::{Error, Result};
use crate::hash::Hash;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Manages named pointers (labels) from strings to hashes.
#[derive(Debug)]
pub struct Labels {
    labels_dir: PathBuf,
}

impl Labels {
    /// Open the label area rooted at `root`, creating its directory if missing.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let labels_dir = root.as_ref().join("labels");
        fs::create_dir_all(&labels_dir)?;
        Ok(Self { labels_dir })
    }

    /// Get the path to a label file.
    fn label_path(&self, name: &str) -> Result<PathBuf> {
        // Validate name - no path traversal
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(Error::invalid_label(format!(
                "Invalid label name: {} (must not contain .. or path separators)",
                name
            )));
        }

        if name.is_empty() {
            return Err(Error::invalid_label("Label name cannot be empty"));
        }

        Ok(self.labels_dir.join(name))
    }

    /// Create a label, or overwrite its target if it already exists.
    pub fn label(&self, hash: &Hash, name: &str) -> Result<()> {
        let path = self.label_path(name)?;
        fs::write(&path, format!("{}\n", hash.to_hex()))?;
        Ok(())
    }

    /// Resolve a label to its target hash, failing if absent.
    pub fn read_label(&self, name: &str) -> Result<Hash> {
        let hash = self.read_label_no_log(name)?;
        tracing::debug!(label = name, hash = %hash, "label read");
        Ok(hash)
    }

    /// Resolve a label without emitting an audit record (bulk/internal reads).
    pub fn read_label_no_log(&self, name: &str) -> Result<Hash> {
        let path = self.label_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::label_not_found(name));
            }
            Err(e) => return Err(e.into()),
        };
        Hash::from_hex(content.trim())
    }

    /// Remove a label. Removing an absent label is a no-op.
    pub fn erase(&self, name: &str) -> Result<()> {
        let path = self.label_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically move a label to a new name, failing if the old name is absent.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_path = self.label_path(old_name)?;
        let new_path = self.label_path(new_name)?;
        if !old_path.exists() {
            return Err(Error::label_not_found(old_name));
        }
        fs::rename(&old_path, &new_path)?;
        Ok(())
    }

    /// Enumerate label names matching `pattern` (a regex; the empty pattern
    /// matches every label).
    ///
    /// The iterator is lazy and one-shot; re-listing requires a fresh call.
    pub fn list(&self, pattern: &str) -> Result<ListLabels> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::invalid_label(format!("Invalid label pattern: {}", e)))?;
        let entries = fs::read_dir(&self.labels_dir)?;
        Ok(ListLabels { entries, pattern })
    }
}

/// One-shot enumeration of label names matching a pattern.
pub struct ListLabels {
    entries: fs::ReadDir,
    pattern: Regex,
}

impl Iterator for ListLabels {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(e) => e,
                Err(e) => return Some(Err(e.into())),
            };
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if self.pattern.is_match(name) {
                return Some(Ok(name.to_string()));
            }
        }
    }
}
