// crates/sentinelops-config/src/lib.rs
// ============================================================================
// Module: SentinelOps Configuration
// Description: Strict, fail-closed TOML configuration loading and validation.
// Purpose: Give every other crate a single, validated source of tunables.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration loads from a TOML file with a hard size cap, UTF-8
//! validation, and per-section `validate()`. Missing or malformed
//! configuration fails closed rather than falling back to silent defaults
//! for the whole document — only individual omitted keys take their
//! documented default.

#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Default configuration filename when no path is given.
const DEFAULT_CONFIG_NAME: &str = "sentinelops.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SENTINELOPS_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file exceeded [`MAX_CONFIG_FILE_SIZE`] or was not UTF-8.
    #[error("invalid config file: {0}")]
    Invalid(String),
    /// The TOML document did not parse.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A parsed value failed semantic validation.
    #[error("config validation failed: {0}")]
    Validation(String),
}

/// Top-level Orchestrator configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SentinelOpsConfig {
    /// Admission Control limits.
    pub admission: AdmissionConfig,
    /// Timer durations for each workflow phase.
    pub timeouts: TimeoutsConfig,
    /// Approval Engine auto-approval thresholds.
    #[serde(rename = "autoApprove")]
    pub auto_approve: AutoApproveConfig,
    /// Recovery Policy retry/backoff tuning.
    pub recovery: RecoveryConfig,
    /// Circuit Breaker thresholds.
    pub circuit: CircuitConfig,
    /// Result Cache bounds.
    pub cache: CacheConfig,
    /// Write Batcher thresholds.
    pub batcher: BatcherConfig,
    /// Audit Log behavior.
    pub audit: AuditConfig,
}

impl Default for SentinelOpsConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionConfig::default(),
            timeouts: TimeoutsConfig::default(),
            auto_approve: AutoApproveConfig::default(),
            recovery: RecoveryConfig::default(),
            circuit: CircuitConfig::default(),
            cache: CacheConfig::default(),
            batcher: BatcherConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl SentinelOpsConfig {
    /// Loads configuration using, in order: `path` if given, else
    /// [`CONFIG_ENV_VAR`], else [`DEFAULT_CONFIG_NAME`] in the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Invalid`] if it exceeds the size cap or is not
    /// UTF-8, [`ConfigError::Parse`] if it is not valid TOML, and
    /// [`ConfigError::Validation`] if a parsed value is semantically
    /// invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = Self::resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let text = std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_path(path: Option<&Path>) -> PathBuf {
        if let Some(path) = path {
            return path.to_path_buf();
        }
        env::var(CONFIG_ENV_VAR).map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from)
    }

    /// Validates every section in turn.
    ///
    /// # Errors
    ///
    /// Returns the first section's [`ConfigError::Validation`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admission.validate()?;
        self.timeouts.validate()?;
        self.auto_approve.validate()?;
        self.recovery.validate()?;
        self.circuit.validate()?;
        self.cache.validate()?;
        self.batcher.validate()?;
        Ok(())
    }
}

/// Admission Control limits. Spec defaults: `maxConcurrentIncidents = 10`,
/// `maxQueueSize = 100`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AdmissionConfig {
    /// Global concurrency cap.
    #[serde(rename = "maxConcurrentIncidents")]
    pub max_concurrent_incidents: usize,
    /// FIFO backlog cap.
    #[serde(rename = "maxQueueSize")]
    pub max_queue_size: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_incidents: 10,
            max_queue_size: 100,
        }
    }
}

impl AdmissionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_incidents < 1 {
            return Err(ConfigError::Validation("admission.maxConcurrentIncidents must be >= 1".to_string()));
        }
        Ok(())
    }
}

/// Per-phase timer durations, in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimeoutsConfig {
    /// Hard incident timeout (`workflowTimeoutSec`, default 1800).
    #[serde(rename = "workflowTimeoutSec")]
    pub workflow_timeout_sec: u64,
    /// Analysis-phase timeout (`analysisTimeoutSec`, default 300).
    #[serde(rename = "analysisTimeoutSec")]
    pub analysis_timeout_sec: u64,
    /// Remediation-phase timeout (`remediationTimeoutSec`, default 600).
    #[serde(rename = "remediationTimeoutSec")]
    pub remediation_timeout_sec: u64,
    /// Approval-phase timeout (`approvalTimeoutSec`, default 1800).
    #[serde(rename = "approvalTimeoutSec")]
    pub approval_timeout_sec: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            workflow_timeout_sec: 1800,
            analysis_timeout_sec: 300,
            remediation_timeout_sec: 600,
            approval_timeout_sec: 1800,
        }
    }
}

impl TimeoutsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workflow_timeout_sec == 0
            || self.analysis_timeout_sec == 0
            || self.remediation_timeout_sec == 0
            || self.approval_timeout_sec == 0
        {
            return Err(ConfigError::Validation("timeouts.* must all be > 0".to_string()));
        }
        Ok(())
    }
}

/// Approval Engine auto-approval thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AutoApproveConfig {
    /// Whether auto-approval is enabled at all.
    pub enabled: bool,
    /// Confidence threshold applied to high-severity incidents
    /// (`autoApprove.confidenceHigh`, default 0.85).
    #[serde(rename = "confidenceHigh")]
    pub confidence_high: f64,
    /// Confidence threshold applied to low-severity incidents
    /// (`autoApprove.confidenceLow`, default 0.60).
    #[serde(rename = "confidenceLow")]
    pub confidence_low: f64,
    /// Maximum action risk eligible for auto-approval
    /// (`autoApprove.maxRisk`, default 0.5).
    #[serde(rename = "maxRisk")]
    pub max_risk: f64,
}

impl Default for AutoApproveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_high: 0.85,
            confidence_low: 0.60,
            max_risk: 0.5,
        }
    }
}

impl AutoApproveConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("confidenceHigh", self.confidence_high),
            ("confidenceLow", self.confidence_low),
            ("maxRisk", self.max_risk),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("autoApprove.{name} must be in [0.0, 1.0]")));
            }
        }
        Ok(())
    }
}

/// Recovery Policy retry/backoff tuning.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RecoveryConfig {
    /// Maximum retry attempts for transient errors (`recovery.maxRetries`,
    /// default 3).
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds (`recovery.baseBackoffMs`, default
    /// 1000).
    #[serde(rename = "baseBackoffMs")]
    pub base_backoff_ms: u64,
    /// Jitter fraction applied to computed backoff
    /// (`recovery.jitterPct`, default 0.2).
    #[serde(rename = "jitterPct")]
    pub jitter_pct: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 1000,
            jitter_pct: 0.2,
        }
    }
}

impl RecoveryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.jitter_pct) {
            return Err(ConfigError::Validation("recovery.jitterPct must be in [0.0, 1.0)".to_string()));
        }
        Ok(())
    }
}

/// Circuit Breaker thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CircuitConfig {
    /// Consecutive/windowed failures before tripping
    /// (`circuit.failureThreshold`).
    #[serde(rename = "failureThreshold")]
    pub failure_threshold: usize,
    /// Rolling window size, in seconds of recent outcomes
    /// (`circuit.windowSec`).
    #[serde(rename = "windowSec")]
    pub window_sec: u64,
    /// Base cooldown before probing again (`circuit.cooldownSec`).
    #[serde(rename = "cooldownSec")]
    pub cooldown_sec: u64,
}

impl Default for CircuitConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            window_sec: 60,
            cooldown_sec: 30,
        }
    }
}

impl CircuitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Validation("circuit.failureThreshold must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Result Cache bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds (`cache.ttlSec`).
    #[serde(rename = "ttlSec")]
    pub ttl_sec: u64,
    /// Maximum resident entries (`cache.maxEntries`).
    #[serde(rename = "maxEntries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_sec: 300,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::Validation("cache.maxEntries must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Write Batcher thresholds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BatcherConfig {
    /// Flush window in milliseconds (`batcher.windowMs`, default 50).
    #[serde(rename = "windowMs")]
    pub window_ms: u64,
    /// Maximum operations per flush (`batcher.maxOps`, default 50).
    #[serde(rename = "maxOps")]
    pub max_ops: usize,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            window_ms: 50,
            max_ops: 50,
        }
    }
}

impl BatcherConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ops == 0 {
            return Err(ConfigError::Validation("batcher.maxOps must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Audit Log behavior.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuditConfig {
    /// Whether audit entries are cryptographically signed in addition to
    /// hash-chained (`audit.signingEnabled`).
    #[serde(rename = "signingEnabled")]
    pub signing_enabled: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            signing_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec() {
        let config = SentinelOpsConfig::default();
        assert_eq!(config.admission.max_concurrent_incidents, 10);
        assert_eq!(config.admission.max_queue_size, 100);
        assert_eq!(config.timeouts.approval_timeout_sec, 1800);
        assert!((config.auto_approve.confidence_high - 0.85).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<SentinelOpsConfig, _> = toml::from_str("bogus_top_level_key = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_confidence_fails_validation() {
        let mut config = SentinelOpsConfig::default();
        config.auto_approve.confidence_high = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_partial_toml_and_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[admission]\nmaxConcurrentIncidents = 5\nmaxQueueSize = 50\n").unwrap();
        let config = SentinelOpsConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.admission.max_concurrent_incidents, 5);
        assert_eq!(config.timeouts.workflow_timeout_sec, 1800);
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let oversized = vec![b'#'; MAX_CONFIG_FILE_SIZE + 1];
        file.write_all(&oversized).unwrap();
        let err = SentinelOpsConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
