// crates/sentinelops-core/src/identifiers.rs
// ============================================================================
// Module: SentinelOps Identifiers
// Description: Canonical opaque identifiers used throughout the Orchestrator.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Opaque newtype identifiers. All wrap a `String` and serialize
//! transparently so they appear as plain strings on the wire.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! string_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(IncidentId, "Uniquely identifies an incident for its entire lifecycle.");
string_id!(MessageId, "Client-supplied identifier used for idempotent message delivery.");
string_id!(IdempotencyKey, "Client-supplied key ensuring an action executes at most once per incident.");
string_id!(RuleId, "Identifies the approval rule that produced a decision.");
string_id!(DependencyName, "Names an external dependency guarded by a circuit breaker (analysis agent, remediation agent, communication channel, store, bus).");
