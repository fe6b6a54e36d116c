//! Object-store access facade.
//!
//! [`ObjectStoreConnection`] is the polymorphic put/get/label surface; the
//! local implementation composes a [`Store`], [`Drafts`] and [`Labels`] triple.
//! Writes follow a draft-then-commit protocol: content is staged on a freshly
//! allocated draft path and promoted into the store with a single atomic
//! rename. A crash before commit orphans the draft but never leaves a partial
//! entry under the hash.

use crate::drafts::Drafts;
use crate::error::Result;
use crate::hash::Hash;
use crate::labels::Labels;
use crate::store::Store;
use crate::stream;
use std::path::Path;

/// The operation set every object-store connection exposes, local or remote.
pub trait ObjectStoreConnection {
    /// Store a byte blob under `hash`.
    fn put_string(&self, blob: &[u8], hash: &Hash) -> Result<()>;

    /// Retrieve the byte blob stored under `hash`.
    fn get_string(&self, hash: &Hash) -> Result<Vec<u8>>;

    /// Store the contents of the file at `path` under `hash`.
    fn put_file(&self, path: &Path, hash: &Hash) -> Result<()>;

    /// Write the object stored under `hash` to the file at `path`.
    fn get_file(&self, path: &Path, hash: &Hash) -> Result<()>;

    /// Membership test.
    fn exists(&self, hash: &Hash) -> Result<bool>;

    /// Validate the object stored under `hash`; a corrupt entry is destroyed
    /// and no error surfaces, but the object may subsequently be absent.
    fn verify(&self, hash: &Hash) -> Result<()>;

    /// Create a label, or overwrite its target if it already exists.
    fn set_label(&self, hash: &Hash, label: &str) -> Result<()>;

    /// Resolve a label to its target hash, failing if absent.
    fn get_label(&self, label: &str) -> Result<Hash>;

    /// Remove a label. Removing an absent label is a no-op.
    fn erase_label(&self, label: &str) -> Result<()>;

    /// Atomically move a label to a new name.
    fn rename_label(&self, current_label: &str, rename_label_to: &str) -> Result<()>;

    /// Collect the names of all labels matching `pattern`.
    fn list_labels(&self, pattern: &str) -> Result<Vec<String>>;
}

/// Connection to a locally reachable store.
///
/// Borrows its collaborators; the caller assembling the connection owns their
/// lifetimes. Conflicting operations must be serialized by the caller.
pub struct LocalConnection<'a> {
    store: &'a Store,
    drafts: &'a Drafts,
    labels: &'a Labels,
}

impl<'a> LocalConnection<'a> {
    pub fn new(store: &'a Store, drafts: &'a Drafts, labels: &'a Labels) -> Self {
        Self {
            store,
            drafts,
            labels,
        }
    }
}

impl ObjectStoreConnection for LocalConnection<'_> {
    fn put_string(&self, blob: &[u8], hash: &Hash) -> Result<()> {
        let draft = self.drafts.allocate_filename()?;
        stream::write_in_chunks(&draft, blob)?;
        self.store.put_existing_file(hash, &draft)
    }

    fn get_string(&self, hash: &Hash) -> Result<Vec<u8>> {
        let original = self.store.filename_for_existing(hash)?;
        Ok(stream::read_in_chunks(&original)?)
    }

    fn put_file(&self, path: &Path, hash: &Hash) -> Result<()> {
        let draft = self.drafts.allocate_filename()?;
        stream::copy_file(path, &draft)?;
        self.store.put_existing_file(hash, &draft)
    }

    fn get_file(&self, path: &Path, hash: &Hash) -> Result<()> {
        let original = self.store.filename_for_existing(hash)?;
        Ok(stream::copy_file(&original, path)?)
    }

    fn exists(&self, hash: &Hash) -> Result<bool> {
        Ok(self.store.exists(hash))
    }

    fn verify(&self, hash: &Hash) -> Result<()> {
        self.store.verify_or_destroy(hash)
    }

    fn set_label(&self, hash: &Hash, label: &str) -> Result<()> {
        self.labels.label(hash, label)
    }

    fn get_label(&self, label: &str) -> Result<Hash> {
        self.labels.read_label(label)
    }

    fn erase_label(&self, label: &str) -> Result<()> {
        self.labels.erase(label)
    }

    fn rename_label(&self, current_label: &str, rename_label_to: &str) -> Result<()> {
        self.labels.rename(current_label, rename_label_to)
    }

    fn list_labels(&self, pattern: &str) -> Result<Vec<String>> {
        self.labels.list(pattern)?.collect()
    }
}
