// crates/sentinelops-core/src/hashing.rs
// ============================================================================
// Module: SentinelOps Hashing
// Description: Canonical JSON hashing used to build the tamper-evident audit chain.
// Purpose: Give the audit log a deterministic, reproducible digest of any payload.
// Dependencies: serde, serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Audit entries are hash-chained: `hash_i = H(hash_{i-1} || payload_i)`.
//! Payloads are canonicalized per RFC 8785 (JSON Canonicalization Scheme)
//! before hashing so that two semantically identical JSON values always
//! produce the same digest regardless of key order or whitespace.

use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as _;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

/// Hash algorithm used for a digest.
///
/// # Invariants
/// - `Sha256` is the only supported algorithm today; the enum exists so the
///   wire format can grow without a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256.
    Sha256,
}

/// Default hash algorithm for new audit chains.
pub const DEFAULT_HASH_ALGORITHM: HashAlgorithm = HashAlgorithm::Sha256;

/// A hash digest paired with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm used to produce `value`.
    pub algorithm: HashAlgorithm,
    /// Lowercase hex-encoded digest bytes.
    pub value: String,
}

impl HashDigest {
    /// Builds a digest from raw bytes and an algorithm tag.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, bytes: &[u8]) -> Self {
        Self {
            algorithm,
            value: hex_encode(bytes),
        }
    }

    /// The all-zero digest used as the `prev_hash` of the first chain entry.
    #[must_use]
    pub fn genesis(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Self {
                algorithm,
                value: hex_encode(&[0u8; 32]),
            },
        }
    }
}

/// Errors produced while hashing.
#[derive(Debug, Error)]
pub enum HashError {
    /// The payload could not be canonicalized to JCS form.
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

/// Serializes a value to canonical (RFC 8785) JSON bytes.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] if `value` cannot be serialized.
pub fn canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes a value's canonical JSON form.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] if `value` cannot be serialized.
pub fn hash_canonical_json<T: Serialize>(
    algorithm: HashAlgorithm,
    value: &T,
) -> Result<HashDigest, HashError> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes(algorithm, &bytes))
}

/// Hashes raw bytes directly.
#[must_use]
pub fn hash_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> HashDigest {
    match algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            HashDigest::new(algorithm, &hasher.finalize())
        }
    }
}

/// Chains a digest: `H(prev.value_bytes || payload_bytes)`.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] if `payload` cannot be
/// canonicalized.
pub fn chain_hash<T: Serialize>(
    algorithm: HashAlgorithm,
    prev: &HashDigest,
    payload: &T,
) -> Result<HashDigest, HashError> {
    let mut buf = hex_decode(&prev.value).map_err(HashError::Canonicalization)?;
    buf.extend(canonical_json_bytes(payload)?);
    Ok(hash_bytes(algorithm, &buf))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // `write!` to a `String` never fails.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn hex_decode(value: &str) -> Result<Vec<u8>, String> {
    if value.len() % 2 != 0 {
        return Err(format!("odd-length hex string: {value}"));
    }
    (0..value.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|err| format!("invalid hex digit in {value}: {err}"))
        })
        .collect()
}

/// Deserializes a value from a JSON digest payload, used by audit replay.
///
/// # Errors
///
/// Returns a `serde_json::Error` if `bytes` is not valid JSON for `T`.
pub fn from_canonical_json_bytes<T: for<'de> Deserialize<'de>>(
    bytes: &[u8],
) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes).map_err(|err| serde_json::Error::custom(err.to_string()))
}
