use serde::{Deserialize, Serialize};

/// What the gate tells the host to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Continue,
    Pause,
    Stop,
    Checkpoint,
    Throttle,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Continue => write!(f, "continue"),
            Decision::Pause => write!(f, "pause"),
            Decision::Stop => write!(f, "stop"),
            Decision::Checkpoint => write!(f, "checkpoint"),
            Decision::Throttle => write!(f, "throttle"),
        }
    }
}

/// Coherence band the score fell into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoherenceLevel {
    Healthy,
    Degraded,
    Critical,
}

impl CoherenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            CoherenceLevel::Healthy
        } else if score >= 0.4 {
            CoherenceLevel::Degraded
        } else {
            CoherenceLevel::Critical
        }
    }
}

/// Uncertainty band the self-reported score fell into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UncertaintyLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl UncertaintyLevel {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.3 {
            UncertaintyLevel::Low
        } else if score <= 0.6 {
            UncertaintyLevel::Moderate
        } else if score <= 0.8 {
            UncertaintyLevel::High
        } else {
            UncertaintyLevel::Extreme
        }
    }
}

/// Derived signals that accompany every decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionMetrics {
    pub coherence_level: CoherenceLevel,
    pub uncertainty_level: UncertaintyLevel,
    pub rework_ratio: f64,
    /// Least-squares slope of token-budget fraction per step.
    pub budget_slope: f64,
}

impl DecisionMetrics {
    /// Neutral metrics for decisions made without a full evaluation,
    /// e.g. inside the cooldown window.
    pub fn minimal() -> Self {
        Self {
            coherence_level: CoherenceLevel::Healthy,
            uncertainty_level: UncertaintyLevel::Low,
            rework_ratio: 0.0,
            budget_slope: 0.0,
        }
    }
}

/// Full gate output for one step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinueDecision {
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub metrics: DecisionMetrics,
    /// Present on every non-continue decision; names the triggering signal.
    pub recommended_action: Option<String>,
    pub step_number: u64,
    pub decided_at_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coherence_band_boundaries() {
        assert_eq!(CoherenceLevel::from_score(0.7), CoherenceLevel::Healthy);
        assert_eq!(CoherenceLevel::from_score(0.69), CoherenceLevel::Degraded);
        assert_eq!(CoherenceLevel::from_score(0.4), CoherenceLevel::Degraded);
        assert_eq!(CoherenceLevel::from_score(0.39), CoherenceLevel::Critical);
    }

    #[test]
    fn uncertainty_band_boundaries() {
        assert_eq!(UncertaintyLevel::from_score(0.3), UncertaintyLevel::Low);
        assert_eq!(UncertaintyLevel::from_score(0.31), UncertaintyLevel::Moderate);
        assert_eq!(UncertaintyLevel::from_score(0.6), UncertaintyLevel::Moderate);
        assert_eq!(UncertaintyLevel::from_score(0.8), UncertaintyLevel::High);
        assert_eq!(UncertaintyLevel::from_score(0.81), UncertaintyLevel::Extreme);
    }

    #[test]
    fn decision_display() {
        assert_eq!(Decision::Checkpoint.to_string(), "checkpoint");
        assert_eq!(Decision::Throttle.to_string(), "throttle");
    }
}
