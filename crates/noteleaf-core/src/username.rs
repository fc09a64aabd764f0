//! Username validation and reservations.
//!
//! Usernames are 3 to 20 characters of ASCII letters, digits, and
//! underscores. Case is preserved for display; uniqueness is enforced on the
//! case-folded key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

/// Minimum username length in characters.
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters.
pub const USERNAME_MAX_LEN: usize = 20;

/// A validated username.
///
/// Carries both the display-case original and the case-folded key used for
/// uniqueness checks. Serializes as the display string; deserialization
/// re-validates, so a `Username` is well-formed by construction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username {
    display: String,
    key: String,
}

impl Username {
    /// Parse and validate a raw username.
    ///
    /// # Errors
    ///
    /// Returns a `UsernameError` describing the first format violation.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        if raw.len() < USERNAME_MIN_LEN {
            return Err(UsernameError::TooShort);
        }
        if raw.len() > USERNAME_MAX_LEN {
            return Err(UsernameError::TooLong);
        }
        if let Some(c) = raw.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
            return Err(UsernameError::InvalidCharacter(c));
        }
        Ok(Self {
            display: raw.to_string(),
            key: raw.to_ascii_lowercase(),
        })
    }

    /// The username as the user entered it.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The case-folded uniqueness key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.display)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.display
    }
}

/// Errors that can occur when validating a username.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    /// The username is shorter than the minimum length.
    #[error("username must be at least 3 characters")]
    TooShort,

    /// The username is longer than the maximum length.
    #[error("username must be at most 20 characters")]
    TooLong,

    /// The username contains a character outside letters, digits, underscore.
    #[error("username may only contain letters, digits, and underscores (found {0:?})")]
    InvalidCharacter(char),
}

/// A uniqueness-enforcing reservation.
///
/// Stored keyed by the case-folded username; at most one reservation exists
/// per key, and a user owns at most one reservation at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameReservation {
    /// Display-case username as the owner entered it.
    pub username: String,

    /// The owning user.
    pub owner: UserId,

    /// When the reservation was created.
    pub reserved_at: DateTime<Utc>,
}
