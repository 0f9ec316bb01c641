use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_kernel_types::{AgentId, Clock, SystemClock};

use crate::authority::WriteAuthority;
use crate::contradiction::{detect_contradictions, Contradiction};
use crate::entry::{build_entry, EntryOptions, MemoryEntry};

const RATE_WINDOW_MS: u64 = 60_000;

/// Gate-wide knobs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MemoryGateConfig {
    /// When false the contradiction scan is skipped entirely.
    pub enable_contradiction_tracking: bool,
}

impl Default for MemoryGateConfig {
    fn default() -> Self {
        Self {
            enable_contradiction_tracking: true,
        }
    }
}

/// Outcome of the role/namespace check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityCheck {
    pub passed: bool,
    pub reason: String,
}

/// Outcome of the sliding-window rate check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCheck {
    pub passed: bool,
    /// Allowed writes observed in the trailing window before this one.
    pub writes_in_window: usize,
    pub limit: u32,
}

/// Outcome of the overwrite check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverwriteCheck {
    pub allowed: bool,
    pub is_overwrite: bool,
}

/// Aggregated admission decision for one write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriteDecision {
    pub allowed: bool,
    /// First failing check category, or "Write allowed".
    pub reason: String,
    pub authority_check: AuthorityCheck,
    pub rate_check: RateCheck,
    pub overwrite_check: OverwriteCheck,
    /// Advisory; never affects `allowed`.
    pub contradictions: Vec<Contradiction>,
}

/// Admission control in front of the shared store. Holds per-agent rate
/// windows; everything else is computed from caller-supplied state.
pub struct MemoryWriteGate {
    config: MemoryGateConfig,
    windows: HashMap<AgentId, VecDeque<u64>>,
    clock: Arc<dyn Clock>,
}

impl MemoryWriteGate {
    pub fn new() -> Self {
        Self::with_config(MemoryGateConfig::default())
    }

    pub fn with_config(config: MemoryGateConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run all four checks for a proposed write. Only allowed writes are
    /// recorded against the rate window, so a blocked write does not eat
    /// into the budget.
    pub fn evaluate_write(
        &mut self,
        authority: &WriteAuthority,
        key: &str,
        namespace: &str,
        value: &serde_json::Value,
        existing: &[MemoryEntry],
    ) -> WriteDecision {
        let now = self.clock.now_ms();

        let authority_check = if authority.may_write(namespace) {
            AuthorityCheck {
                passed: true,
                reason: format!("role {} may write to '{namespace}'", authority.role),
            }
        } else {
            AuthorityCheck {
                passed: false,
                reason: format!("role {} may not write to '{namespace}'", authority.role),
            }
        };

        let writes_in_window = self.prune_window(&authority.agent_id, now);
        let rate_check = RateCheck {
            passed: writes_in_window < authority.max_writes_per_minute as usize,
            writes_in_window,
            limit: authority.max_writes_per_minute,
        };

        let is_overwrite = existing
            .iter()
            .any(|e| e.key == key && e.namespace == namespace);
        let overwrite_check = OverwriteCheck {
            allowed: !is_overwrite || authority.can_overwrite,
            is_overwrite,
        };

        let contradictions = if self.config.enable_contradiction_tracking {
            detect_contradictions(value, existing)
        } else {
            Vec::new()
        };

        let allowed = authority_check.passed && rate_check.passed && overwrite_check.allowed;
        let reason = if !authority_check.passed {
            "Authority check failed"
        } else if !rate_check.passed {
            "Rate limit exceeded"
        } else if !overwrite_check.allowed {
            "Overwrite not permitted"
        } else {
            "Write allowed"
        }
        .to_string();

        if allowed {
            self.windows
                .entry(authority.agent_id.clone())
                .or_default()
                .push_back(now);
        } else {
            debug!(agent = %authority.agent_id, key, namespace, %reason, "write blocked");
        }

        WriteDecision {
            allowed,
            reason,
            authority_check,
            rate_check,
            overwrite_check,
            contradictions,
        }
    }

    /// Confidence of an entry at the current time, decayed exponentially
    /// from its last update.
    pub fn compute_confidence(&self, entry: &MemoryEntry) -> f64 {
        if entry.decay_rate == 0.0 {
            return entry.confidence;
        }
        let elapsed_ms = self.clock.now_ms().saturating_sub(entry.updated_at_ms);
        let hours = elapsed_ms as f64 / 3_600_000.0;
        entry.confidence * (-entry.decay_rate * hours).exp()
    }

    /// Entries whose TTL has elapsed since creation.
    pub fn get_expired_entries<'a>(&self, entries: &'a [MemoryEntry]) -> Vec<&'a MemoryEntry> {
        let now = self.clock.now_ms();
        entries
            .iter()
            .filter(|e| match e.ttl_ms {
                Some(ttl) => now.saturating_sub(e.created_at_ms) > ttl,
                None => false,
            })
            .collect()
    }

    /// Build a store-ready entry stamped with the gate's clock.
    pub fn create_memory_entry(
        &self,
        key: &str,
        namespace: &str,
        value: serde_json::Value,
        authority: &WriteAuthority,
        options: EntryOptions,
    ) -> MemoryEntry {
        build_entry(key, namespace, value, authority, options, self.clock.now_ms())
    }

    pub fn config(&self) -> MemoryGateConfig {
        self.config
    }

    /// Drop window samples older than one minute; returns the remaining
    /// count.
    fn prune_window(&mut self, agent: &AgentId, now: u64) -> usize {
        let Some(window) = self.windows.get_mut(agent) else {
            return 0;
        };
        let cutoff = now.saturating_sub(RATE_WINDOW_MS);
        while window.front().is_some_and(|&ts| ts <= cutoff) {
            window.pop_front();
        }
        window.len()
    }
}

impl Default for MemoryWriteGate {
    fn default() -> Self {
        Self::new()
    }
}
