//! The signed-in player, as supplied by the login collaborator.

use std::{num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// The account that owns the current sessions.
///
/// Games only read the owner; the hub reports scores only when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOwner {
    /// Account id used in score reports.
    pub id: u64,
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

impl SessionOwner {
    /// Creates an owner with the given id and display name and no email.
    #[must_use]
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: String::new(),
        }
    }
}

/// Error returned when an owner description cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid owner id: {source}")]
pub struct OwnerParseError {
    source: ParseIntError,
}

impl FromStr for SessionOwner {
    type Err = OwnerParseError;

    /// Parses `ID[:USERNAME[:EMAIL]]`.
    ///
    /// A missing username defaults to `player<ID>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let id = parts
            .next()
            .unwrap_or_default()
            .trim()
            .parse()
            .map_err(|source| OwnerParseError { source })?;
        let username = parts
            .next()
            .filter(|name| !name.is_empty())
            .map_or_else(|| format!("player{id}"), str::to_owned);
        let email = parts.next().unwrap_or_default().to_owned();
        Ok(Self {
            id,
            username,
            email,
        })
    }
}
