//! # Lodestore
//!
//! The local engine of a content-addressed object store. Content is written
//! once under its cryptographic hash, named labels point at hashes, and
//! unreferenced objects are reclaimed by garbage collection. A companion
//! engine restores filesystem entries (regular files, symlinks, directories,
//! device nodes, FIFOs) to match a previously captured metadata snapshot when
//! materializing stored objects back onto disk.
//!
//! ## Features
//!
//! - Atomic draft-then-commit object writes; readers never see partial entries
//! - Full label CRUD: set, read, erase, rename, pattern listing
//! - Mark-and-sweep purge with labels as the only roots
//! - Exact metadata restoration with strict postcondition checking
//!
//! ## Example
//!
//! ```no_run
//! use lodestore::{Drafts, Hash, Labels, LocalConnection, ObjectStoreConnection, Purge, Store};
//!
//! # fn main() -> lodestore::Result<()> {
//! let store = Store::open("./my-store")?;
//! let drafts = Drafts::open("./my-store")?;
//! let labels = Labels::open("./my-store")?;
//!
//! let connection = LocalConnection::new(&store, &drafts, &labels);
//! let data = b"hello";
//! let hash = Hash::of_bytes(data);
//! connection.put_string(data, &hash)?;
//! connection.set_label(&hash, "latest")?;
//!
//! // Delete everything no label reaches
//! let stats = Purge::new(&store, &labels).purge()?;
//! println!("Deleted {} objects", stats.objects_deleted);
//! # Ok(())
//! # }
//! ```
//!
//! No operation takes locks: callers must serialize conflicting writers, and
//! a purge requires exclusive access for its whole mark and sweep pass.

mod apply;
mod connection;
mod dirlist;
mod drafts;
mod error;
mod file_status;
mod fsutil;
mod hash;
mod labels;
mod purge;
mod store;
mod stream;

pub use apply::ApplyFileStatus;
pub use connection::{LocalConnection, ObjectStoreConnection};
pub use dirlist::parse_hash_from_line;
pub use drafts::Drafts;
pub use error::{Error, Result};
pub use file_status::{FileStatus, FileType};
pub use hash::{HASH_SIZE, Hash};
pub use labels::{Labels, ListLabels};
pub use purge::{Purge, PurgeStats};
pub use store::{ListObjects, Store};
