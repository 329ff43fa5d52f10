pub mod decision;
pub mod scan;

pub use decision::{Disposition, Flag};
pub use scan::{FlagRecord, ScanResult};

use std::collections::BTreeMap;

use crate::entry::{Entry, Kind};

/// Lookup results for one order, one slot per identifier kind.
pub type Lookups = BTreeMap<Kind, Option<Entry>>;

/// Evaluate lookup results into a scan record and a disposition.
///
/// Absent kinds and `None` slots are both "no match". The returned
/// disposition always equals `scan.disposition()`.
pub fn evaluate(lookups: &Lookups) -> (ScanResult, Disposition) {
    let mut scan = ScanResult::new();
    for (kind, entry) in lookups {
        if let Some(entry) = entry {
            scan.record(*kind, entry.flag, entry.notes.clone());
        }
    }
    let disposition = scan.disposition();
    (scan, disposition)
}
