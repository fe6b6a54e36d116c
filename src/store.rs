//! Hash-keyed blob storage.
//!
//! Objects live under `<root>/objects/{prefix}/{suffix}` where `prefix` is the
//! first two hex characters of the hash and `suffix` is the rest. Committed
//! objects are immutable; the only write path is promoting a completed staging
//! file with a rename, so readers never observe a partial entry.

use crate::error::{Error, Result};
use crate::hash::Hash;
use std::fs;
use std::path::{Path, PathBuf};

/// The hash-keyed object store.
#[derive(Debug)]
pub struct Store {
    objects_dir: PathBuf,
}

impl Store {
    /// Open the store rooted at `root`, creating its directory if missing.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let objects_dir = root.as_ref().join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self { objects_dir })
    }

    /// Get the path an object with this hash is stored at.
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        self.objects_dir.join(hash.prefix()).join(hash.suffix())
    }

    /// Atomically promote a completed staging file into the store under `hash`.
    ///
    /// The staging path is consumed by the rename. Committing identical content
    /// under the same hash twice is a no-op from the reader's perspective.
    pub fn put_existing_file(&self, hash: &Hash, staging: &Path) -> Result<()> {
        let obj_path = self.object_path(hash);
        if let Some(parent) = obj_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(staging, &obj_path)?;
        Ok(())
    }

    /// Resolve the storage location for `hash`, failing if absent.
    pub fn filename_for_existing(&self, hash: &Hash) -> Result<PathBuf> {
        let obj_path = self.object_path(hash);
        if !obj_path.exists() {
            return Err(Error::object_not_found(hash.to_hex()));
        }
        Ok(obj_path)
    }

    /// Membership test.
    pub fn exists(&self, hash: &Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// Validate the stored bytes against `hash`; delete the entry on corruption.
    ///
    /// Corruption is self-healing: the entry is removed and `Ok(())` returned,
    /// so the caller sees no error but the object may subsequently be absent.
    pub fn verify_or_destroy(&self, hash: &Hash) -> Result<()> {
        let obj_path = self.filename_for_existing(hash)?;
        let actual = Hash::of_file(&obj_path)?;
        if actual != *hash {
            tracing::warn!(
                expected = %hash,
                actual = %actual,
                "destroying corrupt object"
            );
            fs::remove_file(&obj_path)?;
        }
        Ok(())
    }

    /// Enumerate all stored hashes.
    ///
    /// The iterator is lazy and one-shot; re-listing requires a fresh call.
    /// Entries whose names do not parse as hashes are skipped.
    pub fn list(&self) -> Result<ListObjects> {
        let shards = fs::read_dir(&self.objects_dir)?;
        Ok(ListObjects {
            shards,
            current: None,
        })
    }
}

/// One-shot enumeration of the hashes in a [`Store`].
pub struct ListObjects {
    shards: fs::ReadDir,
    current: Option<(String, fs::ReadDir)>,
}

impl Iterator for ListObjects {
    type Item = Result<Hash>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((prefix, entries)) = self.current.as_mut() {
                for entry in entries.by_ref() {
                    let entry = match entry {
                        Ok(e) => e,
                        Err(e) => return Some(Err(e.into())),
                    };
                    let name = entry.file_name();
                    let Some(suffix) = name.to_str() else { continue };
                    if let Ok(hash) = Hash::from_hex(&format!("{}{}", prefix, suffix)) {
                        return Some(Ok(hash));
                    }
                }
                self.current = None;
            }

            let shard = match self.shards.next() {
                Some(Ok(e)) => e,
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            };
            let shard_path = shard.path();
            if !shard_path.is_dir() {
                continue;
            }
            let Some(prefix) = shard.file_name().to_str().map(String::from) else {
                continue;
            };
            match fs::read_dir(&shard_path) {
                Ok(entries) => self.current = Some((prefix, entries)),
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit(store: &Store, dir: &TempDir, data: &[u8]) -> Hash {
        let hash = Hash::of_bytes(data);
        let staging = dir.path().join(format!("staging-{}", hash.prefix()));
        fs::write(&staging, data).unwrap();
        store.put_existing_file(&hash, &staging).unwrap();
        hash
    }

    #[test]
    fn test_open_creates_objects_dir() {
        let dir = TempDir::new().unwrap();
        Store::open(dir.path()).unwrap();
        assert!(dir.path().join("objects").is_dir());
    }

    #[test]
    fn test_put_existing_file_commits_and_consumes_staging() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let staging = dir.path().join("staging");
        fs::write(&staging, b"payload").unwrap();
        let hash = Hash::of_bytes(b"payload");

        store.put_existing_file(&hash, &staging).unwrap();
        assert!(!staging.exists());
        assert!(store.exists(&hash));
        assert_eq!(fs::read(store.object_path(&hash)).unwrap(), b"payload");
    }

    #[test]
    fn test_put_same_content_twice_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let hash = commit(&store, &dir, b"same");
        let staging = dir.path().join("staging2");
        fs::write(&staging, b"same").unwrap();
        store.put_existing_file(&hash, &staging).unwrap();

        assert_eq!(fs::read(store.object_path(&hash)).unwrap(), b"same");
    }

    #[test]
    fn test_filename_for_existing_not_found() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let hash = Hash::of_bytes(b"nonexistent");
        let result = store.filename_for_existing(&hash);
        assert!(matches!(result, Err(Error::ObjectNotFound { .. })));
    }

    #[test]
    fn test_verify_or_destroy_intact_object() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let hash = commit(&store, &dir, b"intact");
        store.verify_or_destroy(&hash).unwrap();
        assert!(store.exists(&hash));
    }

    #[test]
    fn test_verify_or_destroy_corrupt_object() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let hash = commit(&store, &dir, b"original");
        fs::write(store.object_path(&hash), b"tampered").unwrap();

        // No error surfaces, but the entry is gone afterwards
        store.verify_or_destroy(&hash).unwrap();
        assert!(!store.exists(&hash));
    }

    #[test]
    fn test_verify_or_destroy_absent_object() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let hash = Hash::of_bytes(b"absent");
        assert!(matches!(
            store.verify_or_destroy(&hash),
            Err(Error::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn test_list_enumerates_committed_hashes() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();

        let h1 = commit(&store, &dir, b"one");
        let h2 = commit(&store, &dir, b"two");
        let h3 = commit(&store, &dir, b"three");

        let mut listed: Vec<Hash> = store.list().unwrap().map(|r| r.unwrap()).collect();
        let mut expected = vec![h1, h2, h3];
        listed.sort();
        expected.sort();
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_list_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.list().unwrap().count(), 0);
    }
}
