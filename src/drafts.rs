//! Staging-path allocation for uncommitted writes.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Allocates fresh staging paths under `<root>/drafts`.
///
/// A draft is owned exclusively by its writer until it is committed into the
/// store or abandoned; readers never observe it. Allocation is collision-free
/// under concurrent writers.
#[derive(Debug)]
pub struct Drafts {
    drafts_dir: PathBuf,
}

impl Drafts {
    /// Open the draft area rooted at `root`, creating its directory if missing.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let drafts_dir = root.as_ref().join("drafts");
        fs::create_dir_all(&drafts_dir)?;
        Ok(Self { drafts_dir })
    }

    /// Allocate a fresh, collision-free staging path.
    ///
    /// The path exists as an empty file when returned; the writer truncates or
    /// renames it away.
    pub fn allocate_filename(&self) -> Result<PathBuf> {
        let (_file, path) = tempfile::Builder::new()
            .prefix("draft.")
            .tempfile_in(&self.drafts_dir)?
            .keep()
            .map_err(|e| Error::from(e.error))?;
        Ok(path)
    }
}
