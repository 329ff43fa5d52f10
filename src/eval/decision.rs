use serde::{Deserialize, Serialize};

use crate::error::EntryError;

/// Flag stored on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Blocked,
    Review,
    Verified,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Blocked => "blocked",
            Flag::Review => "review",
            Flag::Verified => "verified",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Flag {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "blocked" => Ok(Flag::Blocked),
            "review" => Ok(Flag::Review),
            "verified" => Ok(Flag::Verified),
            other => Err(EntryError::UnknownFlag(other.to_string())),
        }
    }
}

/// Outcome of scanning an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Disposition {
    /// Nothing matched; order status is left alone.
    None,
    Verified,
    ReviewRequired,
    Blocked,
}

impl Disposition {
    /// Combine the flags of every matched entry.
    ///
    /// Blocked always wins. Review only applies when nothing is verified;
    /// a verified match suppresses review.
    pub fn from_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = Flag>,
    {
        let (mut is_verified, mut is_blocked, mut review_required) = (false, false, false);
        for flag in flags {
            match flag {
                Flag::Verified => is_verified = true,
                Flag::Blocked => is_blocked = true,
                Flag::Review => review_required = true,
            }
        }

        if is_blocked {
            Disposition::Blocked
        } else if review_required && !is_verified {
            Disposition::ReviewRequired
        } else if is_verified {
            Disposition::Verified
        } else {
            Disposition::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::None => "none",
            Disposition::Verified => "verified",
            Disposition::ReviewRequired => "review-required",
            Disposition::Blocked => "blocked",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Disposition::None => "NONE",
            Disposition::Verified => "VERIFIED",
            Disposition::ReviewRequired => "REVIEW_REQUIRED",
            Disposition::Blocked => "BLOCKED",
        }
    }

    /// Order status this disposition writes, if any.
    pub fn order_status(self) -> Option<&'static str> {
        match self {
            Disposition::None => None,
            other => Some(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_is_none() {
        assert_eq!(Disposition::from_flags(std::iter::empty()), Disposition::None);
    }

    #[test]
    fn blocked_beats_everything() {
        assert_eq!(
            Disposition::from_flags([Flag::Verified, Flag::Blocked]),
            Disposition::Blocked
        );
        assert_eq!(
            Disposition::from_flags([Flag::Review, Flag::Blocked]),
            Disposition::Blocked
        );
    }

    #[test]
    fn verified_suppresses_review() {
        assert_eq!(
            Disposition::from_flags([Flag::Review, Flag::Verified]),
            Disposition::Verified
        );
    }

    #[test]
    fn review_alone() {
        assert_eq!(
            Disposition::from_flags([Flag::Review, Flag::Review]),
            Disposition::ReviewRequired
        );
    }

    #[test]
    fn order_status_strings() {
        assert_eq!(Disposition::None.order_status(), None);
        assert_eq!(Disposition::Verified.order_status(), Some("verified"));
        assert_eq!(
            Disposition::ReviewRequired.order_status(),
            Some("review-required")
        );
        assert_eq!(Disposition::Blocked.order_status(), Some("blocked"));
    }

    #[test]
    fn flag_parse() {
        assert_eq!("review".parse::<Flag>().unwrap(), Flag::Review);
        assert!("allow".parse::<Flag>().is_err());
    }
}
