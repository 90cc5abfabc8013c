//! Identifiers that arrive either as JSON strings or JSON numbers.
//!
//! The hosted store hands out integer primary keys for some tables and UUIDs
//! for others, and browser code forwards whichever it holds. Everything is
//! normalised to a string at the boundary.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An opaque record id, accepted as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FlexibleId(String);

impl FlexibleId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FlexibleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlexibleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for FlexibleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => FlexibleId(s.trim().to_string()),
            Raw::Int(n) => FlexibleId(n.to_string()),
            Raw::Uint(n) => FlexibleId(n.to_string()),
        })
    }
}
