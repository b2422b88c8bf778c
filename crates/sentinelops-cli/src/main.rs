// crates/sentinelops-cli/src/main.rs
// ============================================================================
// Module: SentinelOps CLI Entry Point
// Description: Process entry point wiring configuration, the broker, and the
//              providers crate into a running Workflow Engine.
// Purpose: Run the Orchestrator as a single process and expose its
//          administrative control surface.
// Dependencies: clap, sentinelops-broker, sentinelops-config, sentinelops-core,
//               sentinelops-providers, tracing, tracing-subscriber.
// ============================================================================

//! ## Overview
//! The binary has no network listener: the administrative control surface
//! (health, readiness, configuration snapshot, metric scrape) is exposed as
//! subcommands that print JSON to stdout, and the workflow itself is driven
//! by newline-delimited JSON envelopes read from stdin. This keeps every
//! external dependency a CLI flag or a pipe, matching a process meant to
//! run under a supervisor that owns the actual transport.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use sentinelops_broker::BusMessage;
use sentinelops_broker::INBOUND_TOPICS;
use sentinelops_broker::InProcessBus;
use sentinelops_broker::InboundRouter;
use sentinelops_config::ConfigError;
use sentinelops_config::SentinelOpsConfig;
use sentinelops_core::Admission;
use sentinelops_core::ApprovalEngine;
use sentinelops_core::ApprovalRuleSet;
use sentinelops_core::AuditChain;
use sentinelops_core::AuditEntry;
use sentinelops_core::Chain;
use sentinelops_core::HashAlgorithm;
use sentinelops_core::StateMachine;
use sentinelops_core::WorkflowEngine;
use sentinelops_core::WorkflowThresholds;
use sentinelops_providers::InMemoryIncidentStore;
use sentinelops_providers::InMemoryMetricsSink;
use sentinelops_providers::SystemClock;
use thiserror::Error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sentinelops", disable_help_subcommand = true)]
struct Cli {
    /// Log level passed to the `tracing` env filter (overrides `RUST_LOG`).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Orchestrator, reading inbound messages from stdin.
    Run(RunCommand),
    /// Feed one inbound message to a freshly built engine and print the result.
    Inject(InjectCommand),
    /// Recompute an audit chain's hashes and report the first broken link, if any.
    VerifyAudit(VerifyAuditCommand),
    /// Print a liveness probe result.
    Health,
    /// Print a readiness probe result.
    Ready,
    /// Print the effective configuration as JSON.
    ConfigSnapshot(ConfigCommand),
    /// Print an empty metric snapshot (meaningful once wired to a
    /// long-lived metrics sink shared with `run`).
    Metrics,
}

/// Arguments shared by commands that build a full engine.
#[derive(Args, Debug)]
struct EngineArgs {
    /// Optional config file path (defaults to `sentinelops.toml` or
    /// `SENTINELOPS_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    #[command(flatten)]
    engine: EngineArgs,
}

/// Arguments for `inject`.
#[derive(Args, Debug)]
struct InjectCommand {
    #[command(flatten)]
    engine: EngineArgs,
    /// Inbound topic name, e.g. `new_incident`.
    #[arg(long, value_name = "TOPIC")]
    topic: String,
    /// JSON payload for the message.
    #[arg(long, value_name = "JSON")]
    payload: String,
}

/// Arguments for `verify-audit`.
#[derive(Args, Debug)]
struct VerifyAuditCommand {
    /// Path to a JSON file holding a `Vec<AuditEntry>` (one chain).
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

/// Arguments for `config-snapshot`.
#[derive(Args, Debug)]
struct ConfigCommand {
    #[command(flatten)]
    engine: EngineArgs,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors the CLI itself can produce, independent of the workflow errors
/// returned while processing messages.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Stdin, the injected payload, or an audit file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The injected or piped payload was not valid JSON.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Output helpers
// ============================================================================

/// Writes a single line to stdout. The only sanctioned way this binary
/// touches stdout: `print!`/`println!` are denied workspace-wide, so every
/// subcommand's JSON result goes through here instead of `tracing`, which
/// is reserved for operational logging.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

// ============================================================================
// SECTION: Engine assembly
// ============================================================================

/// Concrete engine type this process assembles: an in-memory store and
/// metrics sink, the real system clock, and the in-process bus as
/// dispatcher. A durable deployment swaps these type parameters for its
/// own `sentinelops-providers`-equivalent backends.
type Engine = WorkflowEngine<InMemoryIncidentStore, Arc<InProcessBus>, SystemClock, Arc<InMemoryMetricsSink>>;
type Router = InboundRouter<InMemoryIncidentStore, Arc<InProcessBus>, SystemClock, Arc<InMemoryMetricsSink>>;

/// Builds a fresh engine, its shared outbound bus, and the inbound router
/// over it.
///
/// Every invocation starts from an empty store, audit chain, and metrics
/// sink: this process holds no durable state of its own, by design — a
/// durable deployment swaps `sentinelops-providers`' backends for its own.
fn build_engine(config: &SentinelOpsConfig) -> (Arc<Engine>, Arc<InProcessBus>, Router) {
    let outbound = Arc::new(InProcessBus::new());
    let clock = SystemClock::new();
    let metrics = Arc::new(InMemoryMetricsSink::new());
    let store = InMemoryIncidentStore::new();

    let state_machine = StateMachine::new();
    let approval = ApprovalEngine::new(ApprovalRuleSet::new(Vec::new()));
    let admission = Admission::new(config.admission.max_concurrent_incidents, config.admission.max_queue_size);
    let thresholds = WorkflowThresholds {
        analysis_timeout_secs: config.timeouts.analysis_timeout_sec,
        approval_timeout_secs: config.timeouts.approval_timeout_sec,
        ..WorkflowThresholds::default()
    };
    let audit = AuditChain::new(HashAlgorithm::Sha256);

    let engine = Arc::new(WorkflowEngine::new(
        store,
        Arc::clone(&outbound),
        clock.clone(),
        Arc::clone(&metrics),
        state_machine,
        approval,
        admission,
        thresholds,
        audit,
    ));
    let router = InboundRouter::new(Arc::clone(&engine), Arc::clone(&outbound), clock);

    // A subscriber per outbound topic keeps `publish` from failing with
    // `UnknownTopic`: nothing downstream consumes these in-process, but a
    // real deployment replaces this loop with its own transport adapters.
    for topic in ["analyze_incident", "execute_remediation", "send_notification", "dead_letter"] {
        let (sender, mut receiver) = tokio::sync::mpsc::channel::<BusMessage>(256);
        outbound.subscribe(topic, sender);
        std::thread::spawn(move || {
            while let Some(message) = receiver.blocking_recv() {
                info!(topic = %message.topic, payload = %String::from_utf8_lossy(&message.payload), "outbound message");
            }
        });
    }

    // Polls for elapsed analysis/approval/workflow deadlines and fires them.
    // A durable deployment replaces this with a real timer service; this
    // process has no other clock-driven work to do between inbound messages.
    {
        let timer_engine = Arc::clone(&engine);
        std::thread::spawn(move || {
            loop {
                for incident_id in timer_engine.due_timeouts() {
                    if let Err(err) = timer_engine.on_timeout(&incident_id) {
                        warn!(%incident_id, error = %err, "scheduled timer failed to apply");
                    }
                }
                std::thread::sleep(std::time::Duration::from_millis(500));
            }
        });
    }

    (engine, outbound, router)
}

// ============================================================================
// SECTION: Subcommand handlers
// ============================================================================

fn load_config(args: &EngineArgs) -> Result<SentinelOpsConfig, CliError> {
    match SentinelOpsConfig::load(args.config.as_deref()) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io(_)) if args.config.is_none() => {
            info!("no configuration file found, using defaults");
            Ok(SentinelOpsConfig::default())
        }
        Err(err) => Err(err.into()),
    }
}

/// Wire shape accepted on stdin by `run` and via `--payload` by `inject`.
#[derive(serde::Deserialize)]
struct InboundEnvelope {
    topic: String,
    payload: serde_json::Value,
}

fn command_run(command: RunCommand) -> Result<ExitCode, CliError> {
    let config = load_config(&command.engine)?;
    let (engine, _bus, router) = build_engine(&config);

    if engine.audit().verify_all().is_err() {
        warn!("audit chain failed verification at startup");
        return Ok(ExitCode::from(2));
    }

    info!(topics = ?INBOUND_TOPICS, "orchestrator ready, reading inbound messages from stdin");
    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let envelope: InboundEnvelope = serde_json::from_str(trimmed)?;
        let message = BusMessage {
            topic: envelope.topic,
            payload: serde_json::to_vec(&envelope.payload)?,
        };
        if let Err(err) = router.handle(&message) {
            warn!(error = %err, "workflow engine rejected an inbound message");
        }
    }

    info!("stdin closed, shutting down");
    Ok(ExitCode::SUCCESS)
}

fn command_inject(command: InjectCommand) -> Result<ExitCode, CliError> {
    let config = load_config(&command.engine)?;
    let (engine, _bus, router) = build_engine(&config);

    let payload: serde_json::Value = serde_json::from_str(&command.payload)?;
    let message = BusMessage {
        topic: command.topic,
        payload: serde_json::to_vec(&payload)?,
    };
    let result = router.handle(&message);
    let snapshot = serde_json::json!({
        "ok": result.is_ok(),
        "error": result.err().map(|err| err.to_string()),
        "audit_entries": engine.audit().global().entries(),
    });
    write_stdout_line(&serde_json::to_string_pretty(&snapshot)?)?;
    Ok(ExitCode::SUCCESS)
}

fn command_verify_audit(command: VerifyAuditCommand) -> Result<ExitCode, CliError> {
    let mut file = std::fs::File::open(&command.file)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    let entries: Vec<AuditEntry> = serde_json::from_str(&text)?;
    let chain = Chain::from_entries(HashAlgorithm::Sha256, entries);
    match chain.verify() {
        Ok(()) => {
            write_stdout_line(&serde_json::json!({"status": "ok"}).to_string())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            write_stdout_line(&serde_json::json!({"status": "broken", "reason": err.to_string()}).to_string())?;
            Ok(ExitCode::from(2))
        }
    }
}

fn command_health() -> Result<ExitCode, CliError> {
    write_stdout_line(&serde_json::json!({"status": "ok"}).to_string())?;
    Ok(ExitCode::SUCCESS)
}

fn command_ready() -> Result<ExitCode, CliError> {
    write_stdout_line(&serde_json::json!({"status": "ready"}).to_string())?;
    Ok(ExitCode::SUCCESS)
}

fn command_config_snapshot(command: ConfigCommand) -> Result<ExitCode, CliError> {
    let config = load_config(&command.engine)?;
    let snapshot = serde_json::json!({
        "admission": {
            "maxConcurrentIncidents": config.admission.max_concurrent_incidents,
            "maxQueueSize": config.admission.max_queue_size,
        },
        "timeouts": {
            "workflowTimeoutSec": config.timeouts.workflow_timeout_sec,
            "analysisTimeoutSec": config.timeouts.analysis_timeout_sec,
            "remediationTimeoutSec": config.timeouts.remediation_timeout_sec,
            "approvalTimeoutSec": config.timeouts.approval_timeout_sec,
        },
        "autoApprove": {
            "enabled": config.auto_approve.enabled,
            "confidenceHigh": config.auto_approve.confidence_high,
            "confidenceLow": config.auto_approve.confidence_low,
            "maxRisk": config.auto_approve.max_risk,
        },
        "recovery": {
            "maxRetries": config.recovery.max_retries,
            "baseBackoffMs": config.recovery.base_backoff_ms,
            "jitterPct": config.recovery.jitter_pct,
        },
        "circuit": {
            "failureThreshold": config.circuit.failure_threshold,
            "windowSec": config.circuit.window_sec,
            "cooldownSec": config.circuit.cooldown_sec,
        },
        "cache": {
            "ttlSec": config.cache.ttl_sec,
            "maxEntries": config.cache.max_entries,
        },
        "batcher": {
            "windowMs": config.batcher.window_ms,
            "maxOps": config.batcher.max_ops,
        },
        "audit": {
            "signingEnabled": config.audit.signing_enabled,
        },
    });
    write_stdout_line(&serde_json::to_string_pretty(&snapshot)?)?;
    Ok(ExitCode::SUCCESS)
}

fn command_metrics() -> Result<ExitCode, CliError> {
    let sink = InMemoryMetricsSink::new();
    write_stdout_line(&sink.snapshot().to_string())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Run(command) => command_run(command),
        Commands::Inject(command) => command_inject(command),
        Commands::VerifyAudit(command) => command_verify_audit(command),
        Commands::Health => command_health(),
        Commands::Ready => command_ready(),
        Commands::ConfigSnapshot(command) => command_config_snapshot(command),
        Commands::Metrics => command_metrics(),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            warn!(error = %err, "fatal init failure");
            ExitCode::from(1)
        }
    }
}

fn install_tracing(log_level: Option<&str>) {
    let filter = log_level
        .map(ToString::to_string)
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
