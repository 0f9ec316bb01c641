use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warden_kernel_types::{Clock, SystemClock};

use crate::context::StepContext;
use crate::decision::{
    CoherenceLevel, ContinueDecision, Decision, DecisionMetrics, UncertaintyLevel,
};
use crate::slope::SlopeWindow;

/// Decisions kept in the bounded history.
const HISTORY_CAP: usize = 10_000;

/// Thresholds for the continuation gate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ContinueGateConfig {
    /// Coherence strictly below this stops the run.
    pub min_coherence_for_continue: f64,
    /// Rework ratio strictly above this pauses the run.
    pub max_rework_ratio: f64,
    /// Uncertainty strictly above this pauses the run.
    pub max_uncertainty_for_continue: f64,
    /// Budget-fraction slope strictly above this throttles the run.
    pub max_budget_slope_per_step: f64,
    /// Steps between checkpoint requests. A run that goes twice this long
    /// without checkpointing is stopped.
    pub checkpoint_interval_steps: u64,
    /// Window after a full evaluation during which re-evaluation is
    /// suppressed except for critical stop conditions.
    pub cooldown_ms: u64,
}

impl Default for ContinueGateConfig {
    fn default() -> Self {
        Self {
            min_coherence_for_continue: 0.4,
            max_rework_ratio: 0.3,
            max_uncertainty_for_continue: 0.8,
            max_budget_slope_per_step: 0.02,
            checkpoint_interval_steps: 25,
            cooldown_ms: 30_000,
        }
    }
}

/// Aggregate counters over the decision history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GateStats {
    pub total: usize,
    pub continues: usize,
    pub pauses: usize,
    pub stops: usize,
    pub checkpoints: usize,
    pub throttles: usize,
    pub average_budget_slope: f64,
}

/// Per-step continuation gate.
///
/// `evaluate` is the pure decision function (it only mutates the slope
/// window); `evaluate_with_history` adds the bounded decision history and
/// the cooldown window on top.
pub struct ContinueGate {
    config: ContinueGateConfig,
    slope_window: SlopeWindow,
    history: VecDeque<ContinueDecision>,
    last_full_eval_ms: Option<u64>,
    clock: Arc<dyn Clock>,
}

impl ContinueGate {
    pub fn new() -> Self {
        Self::with_config(ContinueGateConfig::default())
    }

    pub fn with_config(config: ContinueGateConfig) -> Self {
        Self {
            config,
            slope_window: SlopeWindow::default(),
            history: VecDeque::new(),
            last_full_eval_ms: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Evaluate one step. Priority: stop > pause > throttle > checkpoint >
    /// continue. Reasons carry every triggered condition of the winning
    /// category.
    pub fn evaluate(&mut self, ctx: &StepContext) -> ContinueDecision {
        self.record_burn_sample(ctx);
        let slope = self.slope_window.slope();
        let metrics = DecisionMetrics {
            coherence_level: CoherenceLevel::from_score(ctx.coherence_score),
            uncertainty_level: UncertaintyLevel::from_score(ctx.uncertainty_score),
            rework_ratio: ctx.rework_ratio(),
            budget_slope: slope,
        };

        let mut stop_reasons = Vec::new();
        if ctx.coherence_score < self.config.min_coherence_for_continue {
            stop_reasons.push(format!(
                "Coherence {:.2} below minimum {:.2}",
                ctx.coherence_score, self.config.min_coherence_for_continue
            ));
        }
        let overdue = 2 * self.config.checkpoint_interval_steps;
        if self.config.checkpoint_interval_steps > 0 && ctx.steps_since_checkpoint() >= overdue {
            stop_reasons.push(format!(
                "No checkpoint taken for {} steps (limit {})",
                ctx.steps_since_checkpoint(),
                overdue
            ));
        }
        let exhausted = ctx.remaining.exhausted();
        if !exhausted.is_empty() {
            stop_reasons.push(format!("Budget exhausted: {}", exhausted.join(", ")));
        }
        if !stop_reasons.is_empty() {
            warn!(step = ctx.step_number, reasons = ?stop_reasons, "run stopped");
            return self.finish(Decision::Stop, stop_reasons, metrics, ctx);
        }

        let mut pause_reasons = Vec::new();
        if metrics.rework_ratio > self.config.max_rework_ratio {
            pause_reasons.push(format!(
                "Rework ratio {:.2} exceeds {:.2}",
                metrics.rework_ratio, self.config.max_rework_ratio
            ));
        }
        if ctx.uncertainty_score > self.config.max_uncertainty_for_continue {
            pause_reasons.push(format!(
                "Uncertainty {:.2} exceeds {:.2}",
                ctx.uncertainty_score, self.config.max_uncertainty_for_continue
            ));
        }
        if !pause_reasons.is_empty() {
            return self.finish(Decision::Pause, pause_reasons, metrics, ctx);
        }

        if slope > self.config.max_budget_slope_per_step {
            let reasons = vec![format!(
                "Token burn rate {:.4} per step exceeds {:.4}",
                slope, self.config.max_budget_slope_per_step
            )];
            return self.finish(Decision::Throttle, reasons, metrics, ctx);
        }

        if self.config.checkpoint_interval_steps > 0
            && ctx.steps_since_checkpoint() >= self.config.checkpoint_interval_steps
        {
            let reasons = vec![format!(
                "Checkpoint interval reached ({} steps since last checkpoint)",
                ctx.steps_since_checkpoint()
            )];
            return self.finish(Decision::Checkpoint, reasons, metrics, ctx);
        }

        debug!(step = ctx.step_number, "continue");
        self.finish(
            Decision::Continue,
            vec!["All checks passed".to_string()],
            metrics,
            ctx,
        )
    }

    /// Evaluate with the cooldown window and bounded decision history.
    ///
    /// Inside the cooldown the gate answers continue without re-running the
    /// pipeline, unless a critical stop condition (coherence collapse or an
    /// exhausted budget dimension) holds, which stops even during cooldown.
    pub fn evaluate_with_history(&mut self, ctx: &StepContext) -> ContinueDecision {
        let now = self.clock.now_ms();
        let in_cooldown = self
            .last_full_eval_ms
            .is_some_and(|last| now.saturating_sub(last) < self.config.cooldown_ms);

        let decision = if in_cooldown && !self.critical_stop(ctx) {
            ContinueDecision {
                decision: Decision::Continue,
                reasons: vec!["Within cooldown window".to_string()],
                metrics: DecisionMetrics::minimal(),
                recommended_action: None,
                step_number: ctx.step_number,
                decided_at_ms: now,
            }
        } else {
            self.last_full_eval_ms = Some(now);
            self.evaluate(ctx)
        };

        if self.history.len() == HISTORY_CAP {
            self.history.pop_front();
        }
        self.history.push_back(decision.clone());
        decision
    }

    fn critical_stop(&self, ctx: &StepContext) -> bool {
        ctx.coherence_score < self.config.min_coherence_for_continue
            || !ctx.remaining.exhausted().is_empty()
    }

    fn record_burn_sample(&mut self, ctx: &StepContext) {
        let remaining = ctx.remaining.tokens.max(0) as u64;
        let total = ctx.tokens_used.saturating_add(remaining);
        let fraction = if total == 0 {
            0.0
        } else {
            ctx.tokens_used as f64 / total as f64
        };
        self.slope_window.push(ctx.step_number, fraction);
    }

    fn finish(
        &self,
        decision: Decision,
        reasons: Vec<String>,
        metrics: DecisionMetrics,
        ctx: &StepContext,
    ) -> ContinueDecision {
        let recommended_action = match decision {
            Decision::Continue => None,
            Decision::Stop => Some(format!("Halt the run: {}", reasons.join("; "))),
            Decision::Pause => Some(format!(
                "Pause for operator review: {}",
                reasons.join("; ")
            )),
            Decision::Throttle => Some("Reduce token spend per step".to_string()),
            Decision::Checkpoint => Some("Persist a checkpoint before continuing".to_string()),
        };
        ContinueDecision {
            decision,
            reasons,
            metrics,
            recommended_action,
            step_number: ctx.step_number,
            decided_at_ms: self.clock.now_ms(),
        }
    }

    /// Counters over the retained history plus the running average slope.
    pub fn get_stats(&self) -> GateStats {
        let mut stats = GateStats {
            total: self.history.len(),
            ..GateStats::default()
        };
        let mut slope_sum = 0.0;
        for decision in &self.history {
            match decision.decision {
                Decision::Continue => stats.continues += 1,
                Decision::Pause => stats.pauses += 1,
                Decision::Stop => stats.stops += 1,
                Decision::Checkpoint => stats.checkpoints += 1,
                Decision::Throttle => stats.throttles += 1,
            }
            slope_sum += decision.metrics.budget_slope;
        }
        if stats.total > 0 {
            stats.average_budget_slope = slope_sum / stats.total as f64;
        }
        stats
    }

    /// Clear history, cooldown state, and the burn-rate window.
    pub fn reset(&mut self) {
        self.history.clear();
        self.slope_window.clear();
        self.last_full_eval_ms = None;
    }

    pub fn history(&self) -> impl Iterator<Item = &ContinueDecision> {
        self.history.iter()
    }

    pub fn config(&self) -> ContinueGateConfig {
        self.config
    }
}

impl Default for ContinueGate {
    fn default() -> Self {
        Self::new()
    }
}
