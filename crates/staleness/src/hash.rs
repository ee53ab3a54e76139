use scribe_surface::{encode, InterfaceSkeleton};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Lowercase hex SHA-256 digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Hash raw bytes
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Wrap an already-computed hex digest (e.g. one read from a footer)
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash of raw source bytes; always computable
pub fn content_digest(bytes: &[u8]) -> Digest {
    Digest::of(bytes)
}

/// Hash of the canonical interface encoding
pub fn interface_digest(skeleton: &InterfaceSkeleton) -> Digest {
    Digest::of(&encode(skeleton))
}

/// Hash of a design document's body with its footer already stripped
///
/// Trailing newlines are trimmed first, so footer-only rewrites (which may
/// adjust trailing whitespace around the footer block) never change this
/// value.
pub fn design_body_digest(body: &str) -> Digest {
    Digest::of(body.trim_end_matches(['\n', '\r']).as_bytes())
}
