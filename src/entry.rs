//! Denylist/allowlist entries keyed by email or app user id.

use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::eval::Flag;

/// The identifier category an entry is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    AppUserId,
    Email,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::AppUserId, Kind::Email];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::AppUserId => "app_user_id",
            Kind::Email => "email",
        }
    }

    /// Canonical form of an identifier of this kind.
    ///
    /// Emails are trimmed and lower-cased, then validated. App user ids
    /// are trimmed and must be non-empty.
    pub fn normalize(self, raw: &str) -> Result<String, EntryError> {
        let trimmed = raw.trim();
        match self {
            Kind::Email => {
                let email = trimmed.to_lowercase();
                if is_valid_email(&email) {
                    Ok(email)
                } else {
                    Err(EntryError::InvalidEmail(raw.to_string()))
                }
            }
            Kind::AppUserId => {
                if trimmed.is_empty() {
                    Err(EntryError::EmptyIdentifier)
                } else {
                    Ok(trimmed.to_string())
                }
            }
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Kind {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "email" => Ok(Kind::Email),
            "app_user_id" => Ok(Kind::AppUserId),
            other => Err(EntryError::UnknownKind(other.to_string())),
        }
    }
}

/// A stored denylist/allowlist record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: Kind,
    pub identifier: String,
    pub flag: Flag,
    #[serde(default)]
    pub notes: String,
}

impl Entry {
    /// Build a validated entry. The identifier is normalized for its kind.
    pub fn new(
        kind: Kind,
        identifier: &str,
        flag: Flag,
        notes: impl Into<String>,
    ) -> Result<Self, EntryError> {
        let identifier = kind.normalize(identifier)?;
        let notes: String = notes.into();
        Ok(Self {
            kind,
            identifier,
            flag,
            notes: notes.trim().to_string(),
        })
    }

    pub fn email(identifier: &str, flag: Flag, notes: impl Into<String>) -> Result<Self, EntryError> {
        Self::new(Kind::Email, identifier, flag, notes)
    }

    pub fn app_user_id(
        identifier: &str,
        flag: Flag,
        notes: impl Into<String>,
    ) -> Result<Self, EntryError> {
        Self::new(Kind::AppUserId, identifier, flag, notes)
    }
}

// Loose structural check: one '@', non-empty local part, dotted domain.
fn is_valid_email(email: &str) -> bool {
    if email.len() < 6 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    !domain.contains("..")
}
