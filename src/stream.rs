//! Chunked byte-stream primitives.
//!
//! All transfers between store paths and memory or other files go through a
//! fixed-size buffer; the final chunk of a transfer may be shorter. Any encoder
//! producing the same bytes is interchangeable with these helpers.

use std::fs::File;
use std::io::{Read, Result, Write};
use std::path::Path;

/// Buffer size for chunked reads and writes.
pub const CHUNK_SIZE: usize = 4096;

/// Write `blob` to a new file at `path`, one bounded chunk at a time.
pub fn write_in_chunks(path: &Path, blob: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    let mut offset = 0;
    while offset < blob.len() {
        let end = usize::min(offset + CHUNK_SIZE, blob.len());
        file.write_all(&blob[offset..end])?;
        offset = end;
    }
    file.flush()
}

/// Read the file at `path` sequentially to exhaustion into one buffer.
pub fn read_in_chunks(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut accumulator = Vec::new();
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        accumulator.extend_from_slice(&buffer[..n]);
    }
    Ok(accumulator)
}

/// Copy the whole file at `from` to a new file at `to`.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let mut source = File::open(from)?;
    let mut dest = File::create(to)?;
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let n = source.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        dest.write_all(&buffer[..n])?;
    }
    dest.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob");

        // Exercise the empty, sub-chunk, exact-chunk and multi-chunk cases
        for len in [0usize, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE * 2 + 500] {
            let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            write_in_chunks(&path, &data).unwrap();
            assert_eq!(read_in_chunks(&path).unwrap(), data);
        }
    }

    #[test]
    fn test_copy_file() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("from");
        let to = dir.path().join("to");

        let data: Vec<u8> = (0..10_000).map(|i| (i % 13) as u8).collect();
        write_in_chunks(&from, &data).unwrap();
        copy_file(&from, &to).unwrap();
        assert_eq!(read_in_chunks(&to).unwrap(), data);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(read_in_chunks(&dir.path().join("absent")).is_err());
    }
}
