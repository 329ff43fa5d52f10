//! order-gate: flags checkout orders from email and app user id denylists.
//!
//! Each order's billing email and app user id are looked up in an entry
//! store. Matched entries carry a flag (`blocked`, `review`, `verified`)
//! which combine into one of four dispositions:
//! [`eval::Disposition::None`], [`eval::Disposition::Verified`],
//! [`eval::Disposition::ReviewRequired`], or [`eval::Disposition::Blocked`].
//!
//! # Architecture
//!
//! - **[`eval`]** — Pure evaluation: flags, dispositions, scan records.
//! - **[`entry`]** — Entry model and identifier normalization.
//! - **[`store`]** — Entry store trait with in-memory and TOML file backends.
//! - **[`order`]** — Order trait, custom statuses, applying a disposition.
//! - **[`checkout`]** — Lookup/evaluate/apply pipeline and hook JSON I/O.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — Scan log at `~/.local/share/order-gate/scans.log`.

/// Lookup, evaluate, and apply for one checkout.
pub mod checkout;
/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Denylist/allowlist entries and identifier kinds.
pub mod entry;
/// Typed errors.
pub mod error;
/// Evaluation engine: flags, dispositions, scan results.
pub mod eval;
/// File-based scan logging.
pub mod logging;
/// Orders, custom statuses, and the status sink.
pub mod order;
/// Entry store trait and backends.
pub mod store;

use entry::Entry;
use eval::{Disposition, Lookups, ScanResult};

/// Evaluate optional email and app user id matches.
///
/// Convenience over [`eval::evaluate`] for callers holding the two lookup
/// results directly.
pub fn evaluate(email: Option<Entry>, app_user_id: Option<Entry>) -> (ScanResult, Disposition) {
    let lookups = Lookups::from([
        (entry::Kind::Email, email),
        (entry::Kind::AppUserId, app_user_id),
    ]);
    eval::evaluate(&lookups)
}
