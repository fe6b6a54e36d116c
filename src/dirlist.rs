//! Directory-list line parsing.
//!
//! A directory-list object's content is newline-delimited text. Each line is a
//! sequence of whitespace-separated fields; when the final field is a valid
//! 64-hex-character digest it names a child object. Lines without such a field
//! (entries with no stored content, free-form text) carry no reference, which
//! is valid. This is the only mechanism by which one stored object references
//! another.

use crate::hash::{HASH_SIZE, Hash};

/// Attempt to extract a referenced hash from one directory-list line.
pub fn parse_hash_from_line(line: &str) -> Option<Hash> {
    let candidate = line.split_whitespace().next_back()?;
    if candidate.len() != HASH_SIZE * 2 {
        return None;
    }
    Hash::from_hex(candidate).ok()
}
