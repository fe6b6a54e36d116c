//! Filesystem metadata snapshots.

use crate::error::Result;
use std::fmt;
use std::fs;
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::{Path, PathBuf};

/// The kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
}

/// Immutable snapshot of one filesystem entry, captured with `lstat`.
///
/// Produced by inspecting a live path; consumed as a restoration target.
/// Modification time is kept in whole seconds: restoration writes the
/// nanosecond part as zero, so sub-second precision is not an observable
/// attribute of a snapshot.
#[derive(Debug, Clone)]
pub struct FileStatus {
    file_type: FileType,
    mode: u32,
    uid: u32,
    gid: u32,
    mtime: i64,
    symlink_target: Option<PathBuf>,
    rdev: u64,
}

impl FileStatus {
    /// Capture the status of the entry at `path` without following symlinks.
    pub fn capture(path: &Path) -> Result<Self> {
        let metadata = fs::symlink_metadata(path)?;
        let ft = metadata.file_type();

        let file_type = if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::Regular
        } else if ft.is_char_device() {
            FileType::CharDevice
        } else if ft.is_block_device() {
            FileType::BlockDevice
        } else if ft.is_fifo() {
            FileType::Fifo
        } else {
            FileType::Socket
        };

        let symlink_target = if file_type == FileType::Symlink {
            Some(fs::read_link(path)?)
        } else {
            None
        };

        Ok(Self {
            file_type,
            mode: metadata.mode() & 0o7777,
            uid: metadata.uid(),
            gid: metadata.gid(),
            mtime: metadata.mtime(),
            symlink_target,
            rdev: metadata.rdev(),
        })
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Permission bits, including setuid/setgid/sticky.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }

    /// Modification time in whole seconds since the epoch.
    pub fn mtime(&self) -> i64 {
        self.mtime
    }

    /// The stored link target; present only for symlinks.
    pub fn symlink_target(&self) -> Option<&Path> {
        self.symlink_target.as_deref()
    }

    /// Raw device number; meaningful only for device nodes.
    pub fn rdev(&self) -> u64 {
        self.rdev
    }

    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }
}

/// Equality compares every attribute restoration can reproduce for the type:
/// type, owner and group always; the link target for symlinks (a symlink's
/// mode and mtime are not meaningful); permission bits for every non-symlink;
/// mtime for regular files only (non-regular creation does not restore it);
/// the device number for device nodes.
impl PartialEq for FileStatus {
    fn eq(&self, other: &Self) -> bool {
        if self.file_type != other.file_type || self.uid != other.uid || self.gid != other.gid {
            return false;
        }
        match self.file_type {
            FileType::Symlink => self.symlink_target == other.symlink_target,
            FileType::Regular => self.mode == other.mode && self.mtime == other.mtime,
            FileType::CharDevice | FileType::BlockDevice => {
                self.mode == other.mode && self.rdev == other.rdev
            }
            _ => self.mode == other.mode,
        }
    }
}

impl Eq for FileStatus {}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} mode={:o} uid={} gid={} mtime={}",
            self.file_type, self.mode, self.uid, self.gid, self.mtime
        )?;
        if let Some(target) = &self.symlink_target {
            write!(f, " -> {}", target.display())?;
        }
        if matches!(self.file_type, FileType::CharDevice | FileType::BlockDevice) {
            write!(f, " rdev={}", self.rdev)?;
        }
        Ok(())
    }
}
