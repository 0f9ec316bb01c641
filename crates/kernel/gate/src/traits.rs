use serde::{Deserialize, Serialize};
use warden_kernel_types::ParamMap;

/// Verdict severity from an enforcement gate, ordered least to most
/// restrictive so `max` picks the one that governs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnforcementDecision {
    Warn,
    RequireConfirmation,
    Block,
}

impl std::fmt::Display for EnforcementDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnforcementDecision::Warn => write!(f, "warn"),
            EnforcementDecision::RequireConfirmation => write!(f, "require-confirmation"),
            EnforcementDecision::Block => write!(f, "block"),
        }
    }
}

/// One enforcement gate's verdict on a tool call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnforcementVerdict {
    pub decision: EnforcementDecision,
    /// Name of the gate that produced this verdict (e.g. "secrets").
    pub gate_name: String,
    pub reason: String,
    pub triggered_rules: Vec<String>,
    pub remediation: Option<String>,
}

impl EnforcementVerdict {
    pub fn block(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: EnforcementDecision::Block,
            gate_name: gate_name.into(),
            reason: reason.into(),
            triggered_rules: Vec::new(),
            remediation: None,
        }
    }

    pub fn warn(gate_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: EnforcementDecision::Warn,
            gate_name: gate_name.into(),
            reason: reason.into(),
            triggered_rules: Vec::new(),
            remediation: None,
        }
    }
}

/// Reduce multiple verdicts to the single most restrictive one.
pub fn most_restrictive(verdicts: &[EnforcementVerdict]) -> Option<&EnforcementVerdict> {
    verdicts.iter().max_by_key(|v| v.decision)
}

/// Enforcement-gates collaborator, injected into the gateway by the host.
///
/// The gateway does not implement secret or destructive-command detection
/// itself; it only surfaces this collaborator's verdicts. Implementations
/// must not block or perform I/O inline with evaluation.
pub trait EnforcementProvider: Send + Sync {
    fn evaluate(&self, tool: &str, params: &ParamMap) -> Vec<EnforcementVerdict>;
}
