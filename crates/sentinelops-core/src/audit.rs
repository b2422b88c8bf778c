// crates/sentinelops-core/src/audit.rs
// ============================================================================
// Module: SentinelOps Audit Log
// Description: Append-only, hash-chained audit trail with a verification pass.
// Purpose: Give every state transition, decision, and error an immutable record.
// Dependencies: crate::hashing, crate::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! Two independent hash chains are maintained for the same stream of
//! events: a global chain (`incident_id: None` entries included) and one
//! chain per incident. `hash_i = H(hash_{i-1} || payload_i)`, giving each
//! chain a monotonic, tamper-evident sequence.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::hashing::HashAlgorithm;
use crate::hashing::HashDigest;
use crate::hashing::chain_hash;
use crate::identifiers::IncidentId;

/// Errors the audit log can produce.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The payload could not be canonicalized for hashing.
    #[error("audit payload hashing failed: {0}")]
    Hashing(#[from] crate::hashing::HashError),
    /// Chain verification found a broken link.
    #[error("audit chain broken at seq {seq}: expected prev_hash {expected}, found {actual}")]
    Broken {
        /// Sequence number of the first entry whose `prev_hash` does not
        /// match the hash of the preceding entry.
        seq: u64,
        /// The hash that was expected.
        expected: String,
        /// The hash that was actually recorded.
        actual: String,
    },
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonically increasing sequence number within this chain.
    pub seq: u64,
    /// The incident this entry concerns, or `None` for a global-only event.
    pub incident_id: Option<IncidentId>,
    /// Component name that produced the event.
    pub actor: String,
    /// Event type, e.g. `"transition"`, `"approval_decision"`, `"error"`.
    pub event_type: String,
    /// Canonical-JSON hash of the event payload (the payload itself is not
    /// retained in the chain entry, only its digest).
    pub payload_digest: HashDigest,
    /// Hash of the previous entry in this chain (all-zero for the first).
    pub prev_hash: HashDigest,
    /// Hash of this entry: `H(prev_hash || entry-without-hash)`.
    pub hash: HashDigest,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// Fields hashed to produce [`AuditEntry::hash`] — everything in the entry
/// except the hash itself, so the hash cannot reference its own value.
#[derive(Serialize)]
struct AuditEntryPreimage<'a> {
    seq: u64,
    incident_id: Option<&'a IncidentId>,
    actor: &'a str,
    event_type: &'a str,
    payload_digest: &'a HashDigest,
    prev_hash: &'a HashDigest,
    timestamp: &'a str,
}

/// A single append-only hash chain (used for both the global chain and
/// each per-incident chain).
#[derive(Debug, Clone)]
pub struct Chain {
    algorithm: HashAlgorithm,
    entries: Vec<AuditEntry>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            entries: Vec::new(),
        }
    }

    /// Rebuilds a chain from entries loaded off disk, for startup
    /// verification. Does not recompute hashes; call [`Chain::verify`] to
    /// do that.
    #[must_use]
    pub fn from_entries(algorithm: HashAlgorithm, entries: Vec<AuditEntry>) -> Self {
        Self {
            algorithm,
            entries,
        }
    }

    /// Appends a new entry, computing its hash from the previous entry's
    /// hash and this payload.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Hashing`] if `payload` cannot be canonicalized.
    pub fn append<T: Serialize>(
        &mut self,
        incident_id: Option<IncidentId>,
        actor: &str,
        event_type: &str,
        payload: &T,
        timestamp: String,
    ) -> Result<AuditEntry, AuditError> {
        let payload_digest = crate::hashing::hash_canonical_json(self.algorithm, payload)?;
        let seq = self.entries.len() as u64 + 1;
        let prev_hash =
            self.entries.last().map_or_else(|| HashDigest::genesis(self.algorithm), |e| e.hash.clone());

        let preimage = AuditEntryPreimage {
            seq,
            incident_id: incident_id.as_ref(),
            actor,
            event_type,
            payload_digest: &payload_digest,
            prev_hash: &prev_hash,
            timestamp: &timestamp,
        };
        let hash = chain_hash(self.algorithm, &prev_hash, &preimage)?;

        let entry = AuditEntry {
            seq,
            incident_id,
            actor: actor.to_string(),
            event_type: event_type.to_string(),
            payload_digest,
            prev_hash,
            hash,
            timestamp,
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Recomputes every hash in the chain and returns the first mismatch,
    /// if any.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Broken`] naming the first entry whose
    /// recorded hash does not match its recomputed hash, and
    /// [`AuditError::Hashing`] if an entry's stored preimage cannot be
    /// rehashed.
    pub fn verify(&self) -> Result<(), AuditError> {
        let mut expected_prev = HashDigest::genesis(self.algorithm);
        for entry in &self.entries {
            if entry.prev_hash != expected_prev {
                return Err(AuditError::Broken {
                    seq: entry.seq,
                    expected: expected_prev.value,
                    actual: entry.prev_hash.value.clone(),
                });
            }
            let preimage = AuditEntryPreimage {
                seq: entry.seq,
                incident_id: entry.incident_id.as_ref(),
                actor: &entry.actor,
                event_type: &entry.event_type,
                payload_digest: &entry.payload_digest,
                prev_hash: &entry.prev_hash,
                timestamp: &entry.timestamp,
            };
            let recomputed = chain_hash(self.algorithm, &entry.prev_hash, &preimage)?;
            if recomputed != entry.hash {
                return Err(AuditError::Broken {
                    seq: entry.seq,
                    expected: recomputed.value,
                    actual: entry.hash.value.clone(),
                });
            }
            expected_prev = entry.hash.clone();
        }
        Ok(())
    }

    /// Returns all entries in sequence order.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }
}

/// The Audit Log: one global chain plus one chain per incident.
///
/// # Invariants
/// - Every event appended here is also appended to the relevant
///   per-incident chain when `incident_id` is `Some`.
pub struct AuditChain {
    algorithm: HashAlgorithm,
    global: Chain,
    per_incident: HashMap<IncidentId, Chain>,
}

impl AuditChain {
    /// Creates an empty audit log using the given hash algorithm.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            global: Chain::new(algorithm),
            per_incident: HashMap::new(),
        }
    }

    /// Appends an event to the global chain and, if `incident_id` is
    /// `Some`, to that incident's own chain.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if either append fails.
    pub fn record<T: Serialize>(
        &mut self,
        incident_id: Option<IncidentId>,
        actor: &str,
        event_type: &str,
        payload: &T,
        timestamp: String,
    ) -> Result<AuditEntry, AuditError> {
        let global_entry = self.global.append(
            incident_id.clone(),
            actor,
            event_type,
            payload,
            timestamp.clone(),
        )?;
        if let Some(id) = incident_id {
            let chain = self.per_incident.entry(id).or_insert_with(|| Chain::new(self.algorithm));
            chain.append(None, actor, event_type, payload, timestamp)?;
        }
        Ok(global_entry)
    }

    /// Returns the global chain.
    #[must_use]
    pub const fn global(&self) -> &Chain {
        &self.global
    }

    /// Returns a specific incident's chain, if it has any entries.
    #[must_use]
    pub fn incident_chain(&self, id: &IncidentId) -> Option<&Chain> {
        self.per_incident.get(id)
    }

    /// Verifies the global chain and every per-incident chain, returning
    /// the first broken chain's error.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Broken`] for the first chain (global or
    /// per-incident) found to be tampered with.
    pub fn verify_all(&self) -> Result<(), AuditError> {
        self.global.verify()?;
        for chain in self.per_incident.values() {
            chain.verify()?;
        }
        Ok(())
    }
}
