//! Mark-and-sweep garbage collection.
//!
//! Labels are the only roots. The collector starts from the full store
//! enumeration as the stale set, removes every label target and every hash
//! referenced from a reachable directory-list object, then deletes whatever
//! remains. Expansion follows references transitively: nested directory-list
//! objects keep their descendants live, and a line in a non-list object that
//! happens to parse as a hash only ever over-retains.
//!
//! Running a purge concurrently with writers or label mutations is unsafe; a
//! hash written after marking but before sweep can be deleted underneath its
//! writer. Callers must guarantee exclusive execution for the full pass.

use crate::dirlist;
use crate::error::Result;
use crate::hash::Hash;
use crate::labels::Labels;
use crate::store::Store;
use std::collections::HashSet;
use std::fs;

/// Statistics from a purge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeStats {
    /// Number of objects deleted.
    pub objects_deleted: usize,
}

/// One-shot garbage collector over a [`Store`] and its [`Labels`].
pub struct Purge<'a> {
    store: &'a Store,
    labels: &'a Labels,
    stale_hashes: HashSet<Hash>,
}

impl<'a> Purge<'a> {
    pub fn new(store: &'a Store, labels: &'a Labels) -> Self {
        Self {
            store,
            labels,
            stale_hashes: HashSet::new(),
        }
    }

    /// Delete every stored object not reachable from a label.
    ///
    /// Immediately re-running on an unchanged store finds nothing to delete.
    pub fn purge(mut self) -> Result<PurgeStats> {
        self.start_with_all_objects()?;
        let before = self.stale_hashes.len();
        tracing::info!(objects = before, "purge scanned store");

        self.take_out_all_labels()?;
        let after = self.stale_hashes.len();
        tracing::info!(stale = after, live = before - after, "purge marked roots");

        for hash in &self.stale_hashes {
            fs::remove_file(self.store.filename_for_existing(hash)?)?;
        }
        Ok(PurgeStats {
            objects_deleted: after,
        })
    }

    /// Mark-all-garbage starting point: every stored hash is presumed stale.
    fn start_with_all_objects(&mut self) -> Result<()> {
        for hash in self.store.list()? {
            self.stale_hashes.insert(hash?);
        }
        Ok(())
    }

    /// Remove every label target and everything reachable from it.
    fn take_out_all_labels(&mut self) -> Result<()> {
        // Hashes freshly marked live whose content has not been consulted yet
        let mut pending: Vec<Hash> = Vec::new();

        for name in self.labels.list("")? {
            let hash = self.labels.read_label_no_log(&name?)?;
            if self.stale_hashes.remove(&hash) {
                pending.push(hash);
            }
        }

        while let Some(hash) = pending.pop() {
            self.take_out_dir_list(&hash, &mut pending)?;
        }
        Ok(())
    }

    /// Consult one reachable object's lines for child references.
    fn take_out_dir_list(&mut self, hash: &Hash, pending: &mut Vec<Hash>) -> Result<()> {
        // A label may point at a hash that was never stored; nothing to expand.
        let Ok(path) = self.store.filename_for_existing(hash) else {
            return Ok(());
        };
        let content = fs::read(&path)?;
        for line in content.split(|&b| b == b'\n') {
            let Ok(line) = std::str::from_utf8(line) else {
                continue;
            };
            if let Some(child) = dirlist::parse_hash_from_line(line) {
                if self.stale_hashes.remove(&child) {
                    pending.push(child);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{LocalConnection, ObjectStoreConnection};
    use crate::drafts::Drafts;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        store: Store,
        drafts: Drafts,
        labels: Labels,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = Store::open(dir.path()).unwrap();
            let drafts = Drafts::open(dir.path()).unwrap();
            let labels = Labels::open(dir.path()).unwrap();
            Self {
                _dir: dir,
                store,
                drafts,
                labels,
            }
        }

        fn put(&self, data: &[u8]) -> Hash {
            let conn = LocalConnection::new(&self.store, &self.drafts, &self.labels);
            let hash = Hash::of_bytes(data);
            conn.put_string(data, &hash).unwrap();
            hash
        }

        fn purge(&self) -> PurgeStats {
            Purge::new(&self.store, &self.labels).purge().unwrap()
        }
    }

    #[test]
    fn test_purge_empty_store() {
        let fixture = Fixture::new();
        assert_eq!(fixture.purge().objects_deleted, 0);
    }

    #[test]
    fn test_purge_keeps_labelled_deletes_unreferenced() {
        let fixture = Fixture::new();

        let h2 = fixture.put(b"blob two");
        let h3 = fixture.put(b"blob three");
        let h4 = fixture.put(b"blob four, unreferenced");

        // H1 is a directory list referencing H2 and H3, plus one plain line
        let listing = format!(
            "two\t0100644 0 0\t{}\nthree\t0100644 0 0\t{}\nempty-dir\t040755 0 0\n",
            h2.to_hex(),
            h3.to_hex()
        );
        let h1 = fixture.put(listing.as_bytes());
        fixture.labels.label(&h1, "L1").unwrap();

        let stats = fixture.purge();
        assert_eq!(stats.objects_deleted, 1);
        assert!(fixture.store.exists(&h1));
        assert!(fixture.store.exists(&h2));
        assert!(fixture.store.exists(&h3));
        assert!(!fixture.store.exists(&h4));

        // Fixed point: an immediate re-run deletes nothing
        assert_eq!(fixture.purge().objects_deleted, 0);
    }

    #[test]
    fn test_purge_after_label_erased() {
        let fixture = Fixture::new();

        let hash = fixture.put(b"data");
        fixture.labels.label(&hash, "keep").unwrap();
        assert_eq!(fixture.purge().objects_deleted, 0);

        fixture.labels.erase("keep").unwrap();
        assert_eq!(fixture.purge().objects_deleted, 1);
        assert!(!fixture.store.exists(&hash));
    }

    #[test]
    fn test_purge_shared_target_of_two_labels() {
        let fixture = Fixture::new();

        let hash = fixture.put(b"shared");
        fixture.labels.label(&hash, "a").unwrap();
        fixture.labels.label(&hash, "b").unwrap();

        assert_eq!(fixture.purge().objects_deleted, 0);
        assert!(fixture.store.exists(&hash));
    }

    #[test]
    fn test_purge_retains_nested_directory_lists() {
        let fixture = Fixture::new();

        let leaf = fixture.put(b"leaf content");
        let inner = fixture.put(format!("leaf\t0100644 0 0\t{}\n", leaf.to_hex()).as_bytes());
        let outer = fixture.put(format!("inner\t040755 0 0\t{}\n", inner.to_hex()).as_bytes());
        fixture.labels.label(&outer, "root").unwrap();

        let stray = fixture.put(b"stray");

        let stats = fixture.purge();
        assert_eq!(stats.objects_deleted, 1);
        assert!(fixture.store.exists(&outer));
        assert!(fixture.store.exists(&inner));
        assert!(fixture.store.exists(&leaf));
        assert!(!fixture.store.exists(&stray));
    }

    #[test]
    fn test_purge_tolerates_dangling_label() {
        let fixture = Fixture::new();

        // Label points at a hash that was never stored
        let phantom = Hash::of_bytes(b"never written");
        fixture.labels.label(&phantom, "dangling").unwrap();

        let stray = fixture.put(b"stray");
        let stats = fixture.purge();
        assert_eq!(stats.objects_deleted, 1);
        assert!(!fixture.store.exists(&stray));
    }
}
