use core::fmt;

use serde::{Deserialize, Serialize};

/// A geographic scope label (a state).
///
/// Comparison ignores surrounding whitespace and ASCII case, matching how
/// regions are typed by operators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds a region from optional user input, treating blank as absent.
    pub fn from_optional(name: Option<String>) -> Option<Self> {
        name.filter(|n| !n.trim().is_empty()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn key(&self) -> String {
        self.0.trim().to_ascii_lowercase()
    }
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Region {}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Region {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
