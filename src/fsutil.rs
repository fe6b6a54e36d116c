//! Checked wrappers for metadata system calls that `std` does not expose.

use libc::{dev_t, gid_t, mode_t, uid_t};
use std::ffi::CString;
use std::io::{Error, Result};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

fn cstr(path: &Path) -> Result<CString> {
    Ok(CString::new(path.as_os_str().as_bytes())?)
}

/// Perform the `lchown` system call.
pub fn lchown(path: &Path, uid: uid_t, gid: gid_t) -> Result<()> {
    let path_c = cstr(path)?;

    // SAFETY: The C string is of type CString
    // and is therefore null-terminated.
    let status = unsafe { libc::lchown(path_c.as_ptr(), uid, gid) };

    if status == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Perform the `mknod` system call.
pub fn mknod(path: &Path, mode: mode_t, dev: dev_t) -> Result<()> {
    let path_c = cstr(path)?;

    // SAFETY: The C string is of type CString
    // and is therefore null-terminated.
    let status = unsafe { libc::mknod(path_c.as_ptr(), mode, dev) };

    if status == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Perform the `mkfifo` system call.
pub fn mkfifo(path: &Path, mode: mode_t) -> Result<()> {
    let path_c = cstr(path)?;

    // SAFETY: The C string is of type CString
    // and is therefore null-terminated.
    let status = unsafe { libc::mkfifo(path_c.as_ptr(), mode) };

    if status == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Set the modification time of `path` in whole seconds via `utimensat`,
/// leaving the access time untouched and without following symlinks.
pub fn set_mtime(path: &Path, mtime: i64) -> Result<()> {
    let path_c = cstr(path)?;
    let times = [
        libc::timespec {
            tv_sec: 0,
            tv_nsec: libc::UTIME_OMIT,
        },
        libc::timespec {
            tv_sec: mtime as libc::time_t,
            tv_nsec: 0,
        },
    ];

    // SAFETY: The C string is null-terminated and `times` points at two
    // initialized timespec values, as utimensat(2) requires.
    let status = unsafe {
        libc::utimensat(
            libc::AT_FDCWD,
            path_c.as_ptr(),
            times.as_ptr(),
            libc::AT_SYMLINK_NOFOLLOW,
        )
    };

    if status == -1 {
        Err(Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    #[test]
    fn test_lchown_to_own_ids_succeeds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file");
        fs::write(&path, b"x").unwrap();

        let md = fs::metadata(&path).unwrap();
        lchown(&path, md.uid(), md.gid()).unwrap();
    }

    #[test]
    fn test_mkfifo_creates_pipe() {
        use std::os::unix::fs::FileTypeExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pipe");
        mkfifo(&path, 0o600).unwrap();

        let md = fs::symlink_metadata(&path).unwrap();
        assert!(md.file_type().is_fifo());
    }

    #[test]
    fn test_set_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("file");
        fs::write(&path, b"x").unwrap();

        set_mtime(&path, 1_000_000_000).unwrap();
        let md = fs::metadata(&path).unwrap();
        assert_eq!(md.mtime(), 1_000_000_000);
    }

    #[test]
    fn test_missing_path_reports_os_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent");
        assert!(set_mtime(&path, 0).is_err());
        assert!(lchown(&path, 0, 0).is_err());
    }
}
