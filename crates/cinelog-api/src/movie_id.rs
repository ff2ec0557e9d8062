//! `MovieId` - catalog title identifier.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Positive integer identifying a catalog title.
///
/// The sole key for catalog lookups and the local response cache.
/// Zero is not a valid identifier and is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct MovieId(NonZeroU64);

impl MovieId {
    /// Creates a `MovieId`, returning `None` for zero.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// Error returned when a value is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMovieId(String);

impl fmt::Display for InvalidMovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid movie id: {} (expected a positive integer)", self.0)
    }
}

impl std::error::Error for InvalidMovieId {}

impl TryFrom<u64> for MovieId {
    type Error = InvalidMovieId;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| InvalidMovieId(raw.to_string()))
    }
}

impl From<MovieId> for u64 {
    fn from(id: MovieId) -> Self {
        id.get()
    }
}

impl FromStr for MovieId {
    type Err = InvalidMovieId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.trim().parse().map_err(|_| InvalidMovieId(String::from(s)))?;
        Self::try_from(raw).map_err(|_| InvalidMovieId(String::from(s)))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
