//! Error types shared across the store, entry model, and checkout pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::entry::Kind;

/// Errors raised while building or parsing an [`Entry`](crate::entry::Entry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Email failed validation.
    #[error("{0} is not a valid email.")]
    InvalidEmail(String),

    /// App user id was blank after trimming.
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    /// Kind string was neither `email` nor `app_user_id`.
    #[error("unknown entry type: {0}. Use: email, app_user_id")]
    UnknownKind(String),

    /// Flag string was not one of `blocked`, `review`, `verified`.
    #[error("unknown flag: {0}. Use: blocked, review, verified")]
    UnknownFlag(String),
}

/// Errors raised by an [`EntryStore`](crate::store::EntryStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed entry file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode entries: {0}")]
    Encode(#[from] toml::ser::Error),

    /// An entry did not pass validation.
    #[error("invalid entry: {0}")]
    Invalid(#[from] EntryError),

    /// Backend could not be reached.
    #[error("entry store unavailable: {0}")]
    Unavailable(String),
}

/// Raised after an order has been marked `blocked`. The caller must stop
/// the order from completing and show `message` to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BlockedOrder {
    pub order_id: u64,
    pub message: String,
}

/// Errors from [`scan_order`](crate::checkout::scan_order).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Blocked(#[from] BlockedOrder),

    /// Lookup failed under the fail-closed policy. The order is untouched.
    #[error("{kind} lookup failed: {source}")]
    Lookup {
        kind: Kind,
        #[source]
        source: StoreError,
    },

    #[error("entry store failed to load: {source}")]
    Store {
        #[source]
        source: StoreError,
    },

    #[error("Please enter an App User ID.")]
    MissingAppUserId,
}

impl ScanError {
    /// Exit status for the checkout hook: 2 for a blocked order, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScanError::Blocked(_) => 2,
            _ => 1,
        }
    }
}
