//! Restoration of filesystem metadata to match a captured snapshot.
//!
//! [`ApplyFileStatus`] brings one path into exact conformance with a target
//! [`FileStatus`], whatever the path currently holds. Every operation ends by
//! re-capturing the live status and asserting exact equality with the target;
//! a mismatch indicates a logic error or a racing external mutation and is
//! surfaced as [`Error::StatusMismatch`] rather than masked.
//!
//! The remove-then-recreate sequence used for reconciliation has an inherent
//! window between removal and recreation; the final equality check is the
//! safety net for anything racing through it.

use crate::error::{Error, Result};
use crate::file_status::{FileStatus, FileType};
use crate::fsutil;
use std::fs;
use std::os::unix::fs::{PermissionsExt, symlink};
use std::path::Path;

/// Applies a target [`FileStatus`] to one filesystem path.
pub struct ApplyFileStatus<'a> {
    path: &'a Path,
    status: &'a FileStatus,
}

impl<'a> ApplyFileStatus<'a> {
    pub fn new(path: &'a Path, status: &'a FileStatus) -> Self {
        Self { path, status }
    }

    /// Repair the metadata of an existing regular file whose content already
    /// matches the target.
    ///
    /// Ownership is applied first, then modification time, then permission
    /// bits. Changing ownership clears the setuid/setgid bits, so the
    /// permission write must be the last metadata mutation.
    pub fn apply_existing_regular(&self) -> Result<()> {
        self.chown()?;
        self.set_mtime()?;
        self.chmod()?;
        self.verify_applied()
    }

    /// Create a non-regular entry at a path that does not exist yet.
    pub fn create_non_regular(&self) -> Result<()> {
        match self.status.file_type() {
            FileType::Symlink => {
                // The stored target is created verbatim, never resolved.
                let target = self.status.symlink_target().ok_or_else(|| {
                    Error::internal("symlink status without a stored link target")
                })?;
                symlink(target, self.path)
                    .map_err(|e| Error::syscall("symlink", self.path, e))?;
            }
            FileType::Directory => {
                fs::create_dir(self.path)
                    .map_err(|e| Error::syscall("mkdir", self.path, e))?;
                // Unlike symlinks, directories need an explicit mode step
                self.chmod()?;
            }
            FileType::CharDevice | FileType::BlockDevice => self.mknod()?,
            FileType::Fifo => self.mkfifo()?,
            FileType::Socket => {
                return Err(Error::unsupported_file_type(self.path));
            }
            FileType::Regular => {
                return Err(Error::internal("create_non_regular called for a regular file"));
            }
        }

        self.chown()?;
        self.verify_applied()
    }

    /// Reconcile an existing non-regular entry against the target.
    ///
    /// A symlink whose target differs cannot be modified in place; the entry
    /// is removed (best effort) and recreated. The same applies when the
    /// existing entry has a different type entirely.
    pub fn apply_non_regular(&self, existing_status: &FileStatus) -> Result<()> {
        if self.status.file_type() == existing_status.file_type() {
            if self.status.is_symlink() {
                if self.status.symlink_target() != existing_status.symlink_target() {
                    best_effort_remove(self.path);
                    return self.create_non_regular();
                }
            } else {
                self.chmod()?;
            }
            self.chown()?;
            self.verify_applied()
        } else {
            best_effort_remove(self.path);
            self.create_non_regular()
        }
    }

    fn verify_applied(&self) -> Result<()> {
        let live = FileStatus::capture(self.path)?;
        if live != *self.status {
            return Err(Error::status_mismatch(
                self.path,
                live.to_string(),
                self.status.to_string(),
            ));
        }
        Ok(())
    }

    fn chown(&self) -> Result<()> {
        fsutil::lchown(self.path, self.status.uid(), self.status.gid())
            .map_err(|e| Error::syscall("lchown", self.path, e))
    }

    fn chmod(&self) -> Result<()> {
        // chown and mtime updates turn off the setgid bit - this must be last
        debug_assert!(!self.status.is_symlink());
        fs::set_permissions(self.path, fs::Permissions::from_mode(self.status.mode()))
            .map_err(|e| Error::syscall("chmod", self.path, e))
    }

    fn set_mtime(&self) -> Result<()> {
        fsutil::set_mtime(self.path, self.status.mtime())
            .map_err(|e| Error::syscall("utimensat", self.path, e))
    }

    fn mknod(&self) -> Result<()> {
        let kind = match self.status.file_type() {
            FileType::CharDevice => libc::S_IFCHR,
            FileType::BlockDevice => libc::S_IFBLK,
            _ => return Err(Error::internal("mknod called for a non-device target")),
        };
        fsutil::mknod(
            self.path,
            kind | self.status.mode() as libc::mode_t,
            self.status.rdev() as libc::dev_t,
        )
        .map_err(|e| Error::syscall("mknod", self.path, e))
    }

    fn mkfifo(&self) -> Result<()> {
        fsutil::mkfifo(self.path, self.status.mode() as libc::mode_t)
            .map_err(|e| Error::syscall("mkfifo", self.path, e))
    }
}

/// Remove whatever occupies `path`, ignoring the outcome.
///
/// If the path is still occupied afterwards, the following creation step
/// fails loudly and the postcondition check is the true safety net.
fn best_effort_remove(path: &Path) {
    let result = match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::debug!(path = %path.display(), error = %e, "best-effort removal failed");
    }
}
