use serde::{Deserialize, Serialize};
use warden_kernel_types::Budget;

/// Which pipeline stage decided a denial. `None` when admission succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecidingGate {
    None,
    Schema,
    Budget,
    /// An injected enforcement gate, by name.
    Enforcement(String),
}

impl std::fmt::Display for DecidingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecidingGate::None => write!(f, "none"),
            DecidingGate::Schema => write!(f, "schema"),
            DecidingGate::Budget => write!(f, "budget"),
            DecidingGate::Enforcement(name) => write!(f, "enforcement:{name}"),
        }
    }
}

/// Result of one admission check.
///
/// Exactly one gate decides `allowed = false`; `allowed = true` implies
/// `gate = None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayDecision {
    pub allowed: bool,
    pub gate: DecidingGate,
    pub reason: String,
    /// Snapshot of remaining budget at decision time.
    pub remaining: Budget,
    pub idempotency_hit: bool,
    /// Previously recorded result, present only on an idempotency hit.
    pub cached_result: Option<serde_json::Value>,
    /// Non-blocking enforcement verdicts (warn / require-confirmation).
    pub warnings: Vec<String>,
}

impl GatewayDecision {
    pub fn allowed(remaining: Budget) -> Self {
        Self {
            allowed: true,
            gate: DecidingGate::None,
            reason: "Allowed".to_string(),
            remaining,
            idempotency_hit: false,
            cached_result: None,
            warnings: Vec::new(),
        }
    }

    pub fn blocked(gate: DecidingGate, reason: impl Into<String>, remaining: Budget) -> Self {
        Self {
            allowed: false,
            gate,
            reason: reason.into(),
            remaining,
            idempotency_hit: false,
            cached_result: None,
            warnings: Vec::new(),
        }
    }
}

/// One recorded tool invocation, kept for idempotency replay.
///
/// Immutable once stored; records expire after the configured TTL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRecord {
    pub tool_name: String,
    /// Canonical content digest of `(tool, params)`.
    pub digest: String,
    pub result: serde_json::Value,
    pub recorded_at_ms: u64,
    pub duration_ms: u64,
}
