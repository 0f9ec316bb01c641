use serde::{Deserialize, Serialize};

use crate::ids::EventId;

/// Test outcome attached to a run event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub passed: u32,
    pub failed: u32,
}

impl TestSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Telemetry for one completed task. Immutable once recorded; the external
/// ledger is the system of record, this is just the exchanged shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunEvent {
    pub event_id: EventId,
    pub task_id: String,
    pub tools_used: Vec<String>,
    pub files_touched: Vec<String>,
    pub diff_size: u64,
    pub test_results: Option<TestSummary>,
    pub violations: u32,
    pub rework_lines: u64,
    /// Classified task intent ("bug-fix", "security", ...). Drift scoring
    /// counts distinct values of this field across a window.
    pub intent: String,
    pub outcome_accepted: bool,
    pub duration_ms: u64,
}

impl RunEvent {
    /// A minimal event; callers fill in telemetry fields before recording.
    pub fn new(task_id: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            event_id: EventId::new(),
            task_id: task_id.into(),
            tools_used: Vec::new(),
            files_touched: Vec::new(),
            diff_size: 0,
            test_results: None,
            violations: 0,
            rework_lines: 0,
            intent: intent.into(),
            outcome_accepted: false,
            duration_ms: 0,
        }
    }
}

/// Rolling aggregate over a task window, supplied by the host's ledger.
/// The kernel consumes these stats; it does not compute them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationMetrics {
    /// Policy violations per window. Clamp domain [0, 10] when scored.
    pub violation_rate: f64,
    /// Average reworked lines per task. Clamp domain [0, 100] when scored.
    pub rework_lines: f64,
    pub self_correction_rate: f64,
    pub task_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_event_has_unique_id() {
        let a = RunEvent::new("task-1", "bug-fix");
        let b = RunEvent::new("task-1", "bug-fix");
        assert_ne!(a.event_id, b.event_id);
        assert_eq!(a.intent, "bug-fix");
    }

    #[test]
    fn test_summary_pass_fail() {
        assert!(TestSummary { passed: 3, failed: 0 }.all_passed());
        assert!(!TestSummary { passed: 3, failed: 1 }.all_passed());
    }

    #[test]
    fn run_event_serialization_roundtrip() {
        let mut event = RunEvent::new("task-9", "refactor");
        event.tools_used = vec!["search".into(), "edit".into()];
        event.violations = 2;
        event.outcome_accepted = true;

        let json = serde_json::to_string(&event).unwrap();
        let restored: RunEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.event_id, event.event_id);
        assert_eq!(restored.tools_used, event.tools_used);
        assert!(restored.outcome_accepted);
    }
}
