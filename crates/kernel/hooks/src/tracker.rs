use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use warden_kernel_types::{Clock, RunEvent, SystemClock, TestSummary};

use crate::intent::classify_intent;

struct ActiveRun {
    event: RunEvent,
    started_at_ms: u64,
}

/// Tracks in-flight task runs between pre-task and post-task. One record
/// per task id; finalizing a task that was never started is a graceful
/// no-op, not an error.
pub struct RunTracker {
    active: HashMap<String, ActiveRun>,
    clock: Arc<dyn Clock>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open a run record, classifying intent from the description.
    /// Returns the classified intent. Starting an already-active task
    /// replaces its record.
    pub fn start_run(&mut self, task_id: &str, description: &str) -> &'static str {
        let intent = classify_intent(description);
        if self.active.contains_key(task_id) {
            warn!(task_id, "restarting run that was never finalized");
        }
        debug!(task_id, intent, "run started");
        self.active.insert(
            task_id.to_string(),
            ActiveRun {
                event: RunEvent::new(task_id, intent),
                started_at_ms: self.clock.now_ms(),
            },
        );
        intent
    }

    pub fn record_tool_use(&mut self, task_id: &str, tool: &str) {
        if let Some(run) = self.active.get_mut(task_id) {
            run.event.tools_used.push(tool.to_string());
        }
    }

    pub fn record_file_touched(&mut self, task_id: &str, path: &str) {
        if let Some(run) = self.active.get_mut(task_id) {
            if !run.event.files_touched.iter().any(|p| p == path) {
                run.event.files_touched.push(path.to_string());
            }
        }
    }

    pub fn record_violation(&mut self, task_id: &str) {
        if let Some(run) = self.active.get_mut(task_id) {
            run.event.violations += 1;
        }
    }

    pub fn record_rework(&mut self, task_id: &str, lines: u64) {
        if let Some(run) = self.active.get_mut(task_id) {
            run.event.rework_lines += lines;
        }
    }

    pub fn record_diff_size(&mut self, task_id: &str, bytes: u64) {
        if let Some(run) = self.active.get_mut(task_id) {
            run.event.diff_size += bytes;
        }
    }

    pub fn record_test_results(&mut self, task_id: &str, summary: TestSummary) {
        if let Some(run) = self.active.get_mut(task_id) {
            run.event.test_results = Some(summary);
        }
    }

    /// Close a run record into a ledger-ready event. `None` when no run
    /// was active for this task.
    pub fn finalize_run(&mut self, task_id: &str, outcome_accepted: bool) -> Option<RunEvent> {
        let run = self.active.remove(task_id)?;
        let mut event = run.event;
        event.outcome_accepted = outcome_accepted;
        event.duration_ms = self.clock.now_ms().saturating_sub(run.started_at_ms);
        debug!(task_id, accepted = outcome_accepted, "run finalized");
        Some(event)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, task_id: &str) -> bool {
        self.active.contains_key(task_id)
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}
