//! Entry store backends: where denylist/allowlist entries live.
//!
//! The scan pipeline only needs [`EntryStore::lookup`]; the remaining
//! methods back the `entry` admin subcommands.

/// TOML file on disk.
pub mod file;
/// In-process map, for tests and embedding.
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::entry::{Entry, Kind};
use crate::error::StoreError;

/// Trait for entry persistence backends.
///
/// Entries are unique per `(kind, identifier)`; writes overwrite.
pub trait EntryStore: Send + Sync {
    /// Fetch the entry for an already-normalized identifier.
    fn get(&self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError>;

    /// Insert or overwrite. Returns the entry that was replaced, if any.
    fn upsert(&mut self, entry: Entry) -> Result<Option<Entry>, StoreError>;

    /// Delete an entry. Returns it if it existed.
    fn remove(&mut self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError>;

    /// All entries of a kind, sorted by identifier.
    fn list(&self, kind: Kind) -> Result<Vec<Entry>, StoreError>;

    /// Look up a raw identifier as supplied at checkout.
    ///
    /// Blank identifiers and identifiers that fail normalization cannot
    /// match any stored entry and return `Ok(None)` without touching the
    /// backend.
    fn lookup(&self, kind: Kind, identifier: &str) -> Result<Option<Entry>, StoreError> {
        match kind.normalize(identifier) {
            Ok(key) => self.get(kind, &key),
            Err(_) => Ok(None),
        }
    }
}
