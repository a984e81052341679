//! Proposal token type.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier the authoritative store assigns to a proposal record.
///
/// Tokens are opaque to the cache. They are hex strings in practice. A NUL
/// byte is the storage key separator, so decoding rejects tokens that
/// contain one.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.contains('\0') {
            return Err(serde::de::Error::custom("token contains a NUL byte"));
        }
        Ok(Self(raw))
    }
}

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Token {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_rejects_nul() {
        let err = serde_json::from_str::<Token>("\"a\\u0000 1\"").unwrap_err();
        assert!(err.to_string().contains("NUL"));
        let token: Token = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(token.as_str(), "a1b2");
    }
}
