use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// Budget headroom at the time of evaluation. Signed so the host can
/// report overdraw; any dimension at or below zero is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainingBudget {
    pub tokens: i64,
    pub tool_calls: i64,
    pub time_ms: i64,
}

impl RemainingBudget {
    /// Names of dimensions that are exhausted (at or below zero).
    pub fn exhausted(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.tokens <= 0 {
            out.push("tokens");
        }
        if self.tool_calls <= 0 {
            out.push("tool calls");
        }
        if self.time_ms <= 0 {
            out.push("time");
        }
        out
    }
}

/// Snapshot of execution state the host hands the gate once per step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepContext {
    pub step_number: u64,
    pub tokens_used: u64,
    pub tool_calls_used: u64,
    /// Count of steps that revisited earlier work.
    pub rework_count: u64,
    /// Current overall coherence score in [0, 1].
    pub coherence_score: f64,
    /// Self-reported uncertainty in [0, 1].
    pub uncertainty_score: f64,
    pub elapsed_ms: u64,
    /// Step at which the last checkpoint was taken, if any.
    pub last_checkpoint_step: Option<u64>,
    pub remaining: RemainingBudget,
    /// Decisions from recent steps, most recent last.
    pub recent_decisions: Vec<Decision>,
}

impl StepContext {
    pub fn new(step_number: u64) -> Self {
        Self {
            step_number,
            tokens_used: 0,
            tool_calls_used: 0,
            rework_count: 0,
            coherence_score: 1.0,
            uncertainty_score: 0.0,
            elapsed_ms: 0,
            last_checkpoint_step: None,
            remaining: RemainingBudget {
                tokens: i64::MAX,
                tool_calls: i64::MAX,
                time_ms: i64::MAX,
            },
            recent_decisions: Vec::new(),
        }
    }

    /// Rework steps as a fraction of total steps. Step zero counts as one
    /// step so an early rework cannot divide by zero.
    pub fn rework_ratio(&self) -> f64 {
        self.rework_count as f64 / self.step_number.max(1) as f64
    }

    /// Steps elapsed since the last checkpoint, or since step zero if no
    /// checkpoint has been taken yet.
    pub fn steps_since_checkpoint(&self) -> u64 {
        self.step_number
            .saturating_sub(self.last_checkpoint_step.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_names_every_dimension() {
        let remaining = RemainingBudget {
            tokens: 0,
            tool_calls: 5,
            time_ms: -100,
        };
        assert_eq!(remaining.exhausted(), vec!["tokens", "time"]);
    }

    #[test]
    fn rework_ratio_is_safe_at_step_zero() {
        let mut ctx = StepContext::new(0);
        ctx.rework_count = 3;
        assert_eq!(ctx.rework_ratio(), 3.0);
    }

    #[test]
    fn steps_since_checkpoint_without_checkpoint() {
        let ctx = StepContext::new(17);
        assert_eq!(ctx.steps_since_checkpoint(), 17);
    }

    #[test]
    fn steps_since_checkpoint_with_checkpoint() {
        let mut ctx = StepContext::new(30);
        ctx.last_checkpoint_step = Some(25);
        assert_eq!(ctx.steps_since_checkpoint(), 5);
    }
}
