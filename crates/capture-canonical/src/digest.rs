use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::validation::ValidationError;

/// Length in bytes of every digest produced by this crate.
pub const DIGEST_LEN: usize = 32;

/// Supported digest algorithms for content hashes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlg {
    /// SHA-256 (the only algorithm currently accepted).
    #[default]
    #[serde(rename = "sha256")]
    Sha256,
}

impl DigestAlg {
    /// Returns the tag written before the hex digits (`sha256`).
    pub fn tag(self) -> &'static str {
        match self {
            DigestAlg::Sha256 => "sha256",
        }
    }

    /// Resolves an algorithm from its tag, rejecting unknown tags.
    pub fn from_tag(tag: &str) -> Result<Self, ValidationError> {
        match tag {
            "sha256" => Ok(DigestAlg::Sha256),
            other => Err(ValidationError::UnknownAlgorithm(other.to_string())),
        }
    }

    /// Hashes `bytes` with this algorithm.
    pub fn hash(self, bytes: &[u8]) -> Digest {
        let mut out = [0u8; DIGEST_LEN];
        match self {
            DigestAlg::Sha256 => out.copy_from_slice(&Sha256::digest(bytes)),
        }
        Digest::new(self, out)
    }
}

/// Algorithm-tagged 32-byte digest.
///
/// The textual form is `"<tag>:<lowercase hex>"`, e.g.
/// `sha256:19b463b9...a51b`. Serde uses the same string form so records
/// carrying a digest stay self-describing on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest {
    alg: DigestAlg,
    bytes: [u8; DIGEST_LEN],
}

impl Digest {
    /// Wraps raw digest bytes.
    pub fn new(alg: DigestAlg, bytes: [u8; DIGEST_LEN]) -> Self {
        Self { alg, bytes }
    }

    /// All-zero digest; the identity element of [`Digest::xor_in`].
    pub fn zero(alg: DigestAlg) -> Self {
        Self::new(alg, [0u8; DIGEST_LEN])
    }

    /// Algorithm that produced the digest.
    pub fn alg(&self) -> DigestAlg {
        self.alg
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.bytes
    }

    /// Lowercase hex of the digest bytes, without the tag.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Combines `other` into `self` with byte-wise XOR.
    ///
    /// XOR is commutative, associative and self-inverse: absorbing the same
    /// digest twice removes it again. Both digests must share an algorithm.
    pub fn xor_in(&mut self, other: &Digest) {
        debug_assert_eq!(self.alg, other.alg);
        for (acc, byte) in self.bytes.iter_mut().zip(other.bytes.iter()) {
            *acc ^= byte;
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.tag(), self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, digits) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::PatternMismatch {
                field: "digest",
                value: s.to_string(),
            })?;
        let alg = DigestAlg::from_tag(tag)?;

        if digits.len() != DIGEST_LEN * 2 {
            return Err(ValidationError::OutOfBounds {
                field: "digest",
                value: format!("{} hex chars", digits.len()),
            });
        }
        // Uppercase is rejected so the string form stays unique per digest.
        if !digits.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: s.to_string(),
            });
        }

        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| ValidationError::PatternMismatch {
            field: "digest",
            value: s.to_string(),
        })?;
        Ok(Self::new(alg, bytes))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
