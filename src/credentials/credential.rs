//! Credential Values
//!
//! An opaque API key that never prints in full.

use std::fmt;

/// Values this short or shorter are treated as placeholders, not keys
pub const MIN_CREDENTIAL_LEN: usize = 10;

/// A secret authorizing calls to the generation service
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a value if it passes the validity heuristic (longer than
    /// [`MIN_CREDENTIAL_LEN`] characters)
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.chars().count() > MIN_CREDENTIAL_LEN {
            Some(Self(value))
        } else {
            None
        }
    }

    /// The raw secret, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters, safe to log
    pub fn suffix(&self) -> &str {
        let start = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(...{})", self.suffix())
    }
}
