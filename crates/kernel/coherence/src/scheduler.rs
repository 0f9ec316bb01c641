use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warden_kernel_types::{Clock, OptimizationMetrics, RunEvent, SystemClock};

use crate::error::CoherenceError;
use crate::score::{CoherenceScore, PrivilegeLevel};

/// Ordered score thresholds. Must satisfy `read_only < warning < healthy`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoherenceThresholds {
    /// At or above: full privileges.
    pub healthy: f64,
    /// At or above (but below healthy): restricted.
    pub warning: f64,
    /// At or above (but below warning): read-only. Below: suspended.
    pub read_only: f64,
}

impl Default for CoherenceThresholds {
    fn default() -> Self {
        Self {
            healthy: 0.70,
            warning: 0.50,
            read_only: 0.30,
        }
    }
}

impl CoherenceThresholds {
    pub fn validate(&self) -> Result<(), CoherenceError> {
        if self.read_only < self.warning && self.warning < self.healthy {
            Ok(())
        } else {
            Err(CoherenceError::InvalidThresholds {
                read_only: self.read_only,
                warning: self.warning,
                healthy: self.healthy,
            })
        }
    }
}

/// Scheduler configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub thresholds: CoherenceThresholds,
    /// How many recent events the drift component examines.
    pub window_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thresholds: CoherenceThresholds::default(),
            window_size: 20,
        }
    }
}

const HISTORY_CAP: usize = 100;

/// Weighted health scoring over the recent run-event window.
///
/// Leaf component: consumes caller-supplied rolling metrics and events,
/// owns only its bounded score history.
pub struct CoherenceScheduler {
    config: SchedulerConfig,
    history: VecDeque<CoherenceScore>,
    clock: Arc<dyn Clock>,
}

impl CoherenceScheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self, CoherenceError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CoherenceError> {
        config.thresholds.validate()?;
        Ok(Self {
            config,
            history: VecDeque::new(),
            clock,
        })
    }

    /// Compute the coherence score for the current window and append it to
    /// the bounded history.
    pub fn compute_coherence(
        &mut self,
        metrics: &OptimizationMetrics,
        events: &[RunEvent],
    ) -> CoherenceScore {
        let violation = 1.0 - metrics.violation_rate / 10.0;
        let rework = 1.0 - metrics.rework_lines / 100.0;

        let window_start = events.len().saturating_sub(self.config.window_size);
        let window = &events[window_start..];
        let drift = drift_component(window);

        let score = CoherenceScore::new(
            violation,
            rework,
            drift,
            self.clock.now_ms(),
            window.len(),
        );

        if score.overall < self.config.thresholds.warning {
            warn!(
                overall = score.overall,
                violation = score.violation_component,
                rework = score.rework_component,
                drift = score.drift_component,
                "Coherence below warning threshold"
            );
        } else {
            debug!(overall = score.overall, "Coherence computed");
        }

        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(score);
        score
    }

    /// Map a score to its privilege level through the ordered thresholds.
    pub fn privilege_level(&self, score: &CoherenceScore) -> PrivilegeLevel {
        let t = &self.config.thresholds;
        if score.overall >= t.healthy {
            PrivilegeLevel::Full
        } else if score.overall >= t.warning {
            PrivilegeLevel::Restricted
        } else if score.overall >= t.read_only {
            PrivilegeLevel::ReadOnly
        } else {
            PrivilegeLevel::Suspended
        }
    }

    pub fn is_healthy(&self, score: &CoherenceScore) -> bool {
        score.overall >= self.config.thresholds.healthy
    }

    pub fn is_drifting(&self, score: &CoherenceScore) -> bool {
        score.overall < self.config.thresholds.warning
    }

    pub fn should_restrict(&self, score: &CoherenceScore) -> bool {
        score.overall < self.config.thresholds.warning
    }

    /// Guidance text keyed to the weak component(s) and the absolute band.
    pub fn recommendation(&self, score: &CoherenceScore) -> String {
        let mut parts = Vec::new();

        if score.overall < self.config.thresholds.read_only {
            parts.push(
                "Coherence critically low; suspend the agent pending review".to_string(),
            );
        }
        if score.violation_component < 0.5 {
            parts.push("High violation rate; tighten policy adherence".to_string());
        }
        if score.rework_component < 0.5 {
            parts.push("Excessive rework; slow down and verify before committing".to_string());
        }
        if score.drift_component < 0.5 {
            parts.push("Behavioral drift detected; refocus on a single task intent".to_string());
        }

        if parts.is_empty() {
            if score.overall >= 0.9 {
                "Coherence excellent; agent is eligible for privilege escalation".to_string()
            } else {
                "Coherence healthy; no action needed".to_string()
            }
        } else {
            parts.join(". ")
        }
    }

    /// Scores recorded so far, oldest first. Capped at 100 entries.
    pub fn history(&self) -> impl Iterator<Item = &CoherenceScore> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }
}

/// Intent dispersion over a window: a single repeated intent is perfectly
/// coherent (1); maximal diversity is 0. Windows of 0 or 1 events are
/// coherent by definition.
fn drift_component(window: &[RunEvent]) -> f64 {
    let n = window.len();
    if n <= 1 {
        return 1.0;
    }
    let unique: HashSet<&str> = window.iter().map(|e| e.intent.as_str()).collect();
    let u = unique.len();
    1.0 - (u as f64 - 1.0) / (n as f64 - 1.0)
}
