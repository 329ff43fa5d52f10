use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entry::Kind;
use crate::eval::{Disposition, Flag};

/// Flag and notes copied from a matched entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagRecord {
    pub flag: Flag,
    pub notes: String,
}

/// Per-order record of which identifiers matched.
///
/// Serializes as `{"app_user_id": {"flag": .., "notes": ..}, "email": {..}}`
/// with kinds that had no match omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult {
    per_kind: BTreeMap<Kind, FlagRecord>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match. A second record for the same kind replaces the first.
    pub fn record(&mut self, kind: Kind, flag: Flag, notes: impl Into<String>) {
        self.per_kind.insert(
            kind,
            FlagRecord {
                flag,
                notes: notes.into(),
            },
        );
    }

    pub fn get(&self, kind: Kind) -> Option<&FlagRecord> {
        self.per_kind.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.per_kind.is_empty()
    }

    pub fn len(&self) -> usize {
        self.per_kind.len()
    }

    /// Derived from the recorded flags only.
    pub fn disposition(&self) -> Disposition {
        Disposition::from_flags(self.per_kind.values().map(|r| r.flag))
    }

    /// JSON object string stored on the order for audit.
    pub fn to_annotation(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = self
            .per_kind
            .iter()
            .map(|(kind, r)| {
                (
                    kind.as_str().to_string(),
                    serde_json::json!({ "flag": r.flag.as_str(), "notes": r.notes }),
                )
            })
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    pub fn from_annotation(annotation: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(annotation)
    }
}
