use std::sync::Arc;

use tracing::info;
use warden_kernel_gate::{most_restrictive, EnforcementDecision, EnforcementProvider};
use warden_kernel_types::{Clock, ParamMap, ParamValue, SystemClock};

use crate::context::{HookContext, LifecyclePoint};
use crate::result::HookResult;
use crate::tracker::RunTracker;

/// Dispatches lifecycle hooks to the enforcement collaborator and the run
/// tracker. The engine owns no policy itself; it reduces enforcement
/// verdicts to a uniform outcome and keeps run records between pre-task
/// and post-task.
pub struct HookEngine {
    enforcement: Option<Box<dyn EnforcementProvider>>,
    tracker: RunTracker,
}

impl HookEngine {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            enforcement: None,
            tracker: RunTracker::new().with_clock(clock),
        }
    }

    pub fn with_enforcement(mut self, provider: Box<dyn EnforcementProvider>) -> Self {
        self.enforcement = Some(provider);
        self
    }

    pub fn dispatch(&mut self, point: LifecyclePoint, ctx: &HookContext) -> HookResult {
        match point {
            LifecyclePoint::PreCommand => self.pre_command(ctx),
            LifecyclePoint::PreToolUse => self.pre_tool_use(ctx),
            LifecyclePoint::PreEdit => self.pre_edit(ctx),
            LifecyclePoint::PreTask => self.pre_task(ctx),
            LifecyclePoint::PostTask => self.post_task(ctx),
        }
    }

    /// Shell command about to run. Routed through enforcement under the
    /// synthetic tool name "command".
    pub fn pre_command(&mut self, ctx: &HookContext) -> HookResult {
        let Some(command) = &ctx.command else {
            return HookResult::ok();
        };
        let mut params = ParamMap::new();
        params.insert("command".to_string(), ParamValue::from(command.as_str()));
        self.enforce("command", &params)
    }

    pub fn pre_tool_use(&mut self, ctx: &HookContext) -> HookResult {
        let (Some(tool), Some(params)) = (&ctx.tool_name, &ctx.params) else {
            return HookResult::ok();
        };
        let result = self.enforce(tool, params);
        if result.success {
            if let Some(task_id) = ctx.task_id.clone() {
                self.tracker.record_tool_use(&task_id, tool);
            }
        }
        result
    }

    /// File about to be edited. Routed through enforcement under the
    /// synthetic tool name "edit".
    pub fn pre_edit(&mut self, ctx: &HookContext) -> HookResult {
        let Some(path) = &ctx.file_path else {
            return HookResult::ok();
        };
        let mut params = ParamMap::new();
        params.insert("file_path".to_string(), ParamValue::from(path.as_str()));
        let result = self.enforce("edit", &params);
        if result.success {
            if let Some(task_id) = ctx.task_id.clone() {
                self.tracker.record_file_touched(&task_id, path);
            }
        }
        result
    }

    /// Classify intent and open a run record. The classified intent comes
    /// back in `data`.
    pub fn pre_task(&mut self, ctx: &HookContext) -> HookResult {
        let Some(task_id) = &ctx.task_id else {
            return HookResult::ok();
        };
        let description = ctx.task_description.as_deref().unwrap_or("");
        let intent = self.tracker.start_run(task_id, description);
        info!(task_id = %task_id, intent, "task started");
        HookResult::ok().data(serde_json::json!({ "intent": intent }))
    }

    /// Close the run record into a ledger-ready event, returned in `data`.
    pub fn post_task(&mut self, ctx: &HookContext) -> HookResult {
        let Some(task_id) = &ctx.task_id else {
            return HookResult::ok();
        };
        let accepted = ctx.outcome_accepted.unwrap_or(false);
        match self.tracker.finalize_run(task_id, accepted) {
            Some(event) => {
                let data = serde_json::to_value(&event)
                    .unwrap_or(serde_json::Value::Null);
                HookResult::ok().data(data)
            }
            None => HookResult::ok_with_message(format!("no active run for task '{task_id}'")),
        }
    }

    pub fn tracker(&mut self) -> &mut RunTracker {
        &mut self.tracker
    }

    /// Reduce enforcement verdicts: block aborts, anything milder passes
    /// with a warning.
    fn enforce(&self, tool: &str, params: &ParamMap) -> HookResult {
        let Some(provider) = &self.enforcement else {
            return HookResult::ok();
        };
        let verdicts = provider.evaluate(tool, params);
        let Some(top) = most_restrictive(&verdicts) else {
            return HookResult::ok();
        };
        match top.decision {
            EnforcementDecision::Block => {
                let mut message = format!("{}: {}", top.gate_name, top.reason);
                if let Some(remediation) = &top.remediation {
                    message.push_str(&format!(" ({remediation})"));
                }
                HookResult::aborted(message)
            }
            EnforcementDecision::RequireConfirmation | EnforcementDecision::Warn => {
                let mut result = HookResult::ok();
                for verdict in &verdicts {
                    result = result.warning(format!("{}: {}", verdict.gate_name, verdict.reason));
                }
                result
            }
        }
    }
}

impl Default for HookEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_kernel_gate::EnforcementVerdict;
    use warden_kernel_types::ManualClock;

    struct BlockSecrets;

    impl EnforcementProvider for BlockSecrets {
        fn evaluate(&self, _tool: &str, params: &ParamMap) -> Vec<EnforcementVerdict> {
            let text = params
                .values()
                .filter_map(|v| match v {
                    ParamValue::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ");
            if text.contains("API_KEY") {
                vec![EnforcementVerdict::block("secrets", "credential detected")]
            } else if text.contains("sudo") {
                vec![EnforcementVerdict::warn("commands", "privileged command")]
            } else {
                Vec::new()
            }
        }
    }

    fn engine() -> HookEngine {
        HookEngine::with_clock(Arc::new(ManualClock::new(0)))
            .with_enforcement(Box::new(BlockSecrets))
    }

    #[test]
    fn missing_context_succeeds_trivially() {
        let mut engine = engine();
        let empty = HookContext::new();
        for point in [
            LifecyclePoint::PreCommand,
            LifecyclePoint::PreToolUse,
            LifecyclePoint::PreEdit,
            LifecyclePoint::PreTask,
            LifecyclePoint::PostTask,
        ] {
            let result = engine.dispatch(point, &empty);
            assert!(result.success, "{point} should pass without context");
            assert!(!result.abort);
        }
    }

    #[test]
    fn blocking_verdict_aborts_the_command() {
        let mut engine = engine();
        let ctx = HookContext::new().command("export API_KEY=abc123");
        let result = engine.pre_command(&ctx);
        assert!(result.abort);
        assert!(result.message.unwrap().contains("secrets"));
    }

    #[test]
    fn warn_verdict_passes_with_warning() {
        let mut engine = engine();
        let ctx = HookContext::new().command("sudo make install");
        let result = engine.pre_command(&ctx);
        assert!(result.success);
        assert!(!result.abort);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn pre_tool_use_records_against_the_active_run() {
        let mut engine = engine();
        engine.pre_task(&HookContext::new().task("t-1", "add csv export"));
        let mut params = ParamMap::new();
        params.insert("query".to_string(), ParamValue::from("serde"));
        let ctx = HookContext::new().tool("search", params).task("t-1", "");
        assert!(engine.pre_tool_use(&ctx).success);

        let event = engine.tracker().finalize_run("t-1", true).unwrap();
        assert_eq!(event.tools_used, vec!["search".to_string()]);
    }

    #[test]
    fn pre_task_reports_classified_intent() {
        let mut engine = engine();
        let result = engine.pre_task(&HookContext::new().task("t-1", "fix broken pagination"));
        assert!(result.success);
        assert_eq!(result.data.unwrap()["intent"], "bug-fix");
    }

    #[test]
    fn post_task_returns_the_run_event() {
        let mut engine = engine();
        engine.pre_task(&HookContext::new().task("t-1", "refactor config"));
        let result = engine.post_task(&HookContext::new().task("t-1", "").outcome(true));
        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["task_id"], "t-1");
        assert_eq!(data["intent"], "refactor");
        assert_eq!(data["outcome_accepted"], true);
    }

    #[test]
    fn post_task_without_run_reports_gracefully() {
        let mut engine = engine();
        let result = engine.post_task(&HookContext::new().task("ghost", ""));
        assert!(result.success);
        assert!(result.message.unwrap().contains("no active run"));
    }
}
