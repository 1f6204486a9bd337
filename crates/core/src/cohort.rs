//! Cohort model - the rating bracket progress and targets are keyed by.

use serde::{Deserialize, Serialize};

/// Wire value of the wildcard cohort.
pub const ALL_COHORTS: &str = "ALL_COHORTS";

/// A named skill/rating bracket, or the wildcard covering every bracket.
///
/// Strings are parsed into this type once when they enter the system, so the
/// wildcard is never re-detected by string comparison further down.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cohort {
    /// A concrete bracket such as `1200-1300`.
    Specific(String),
    /// The reserved default bucket (`ALL_COHORTS`).
    All,
}

impl Cohort {
    /// Parse a cohort from its wire representation.
    pub fn parse(raw: &str) -> Self {
        Self::from(raw.to_string())
    }

    /// Create a specific cohort.
    pub fn specific(name: impl Into<String>) -> Self {
        Self::Specific(name.into())
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Specific(name) => name,
            Self::All => ALL_COHORTS,
        }
    }

    /// True for the wildcard cohort.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// A specific cohort with an empty name.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Specific(name) => name.is_empty(),
            Self::All => false,
        }
    }
}

impl From<String> for Cohort {
    fn from(raw: String) -> Self {
        if raw == ALL_COHORTS {
            Self::All
        } else {
            Self::Specific(raw)
        }
    }
}

impl From<Cohort> for String {
    fn from(cohort: Cohort) -> Self {
        match cohort {
            Cohort::Specific(name) => name,
            Cohort::All => ALL_COHORTS.to_string(),
        }
    }
}

impl From<&str> for Cohort {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl std::fmt::Display for Cohort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
