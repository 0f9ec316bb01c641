use serde::{Deserialize, Serialize};
use warden_kernel_types::ParamMap;

/// The five places the host calls into the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecyclePoint {
    PreCommand,
    PreToolUse,
    PreEdit,
    PreTask,
    PostTask,
}

impl std::fmt::Display for LifecyclePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecyclePoint::PreCommand => write!(f, "pre-command"),
            LifecyclePoint::PreToolUse => write!(f, "pre-tool-use"),
            LifecyclePoint::PreEdit => write!(f, "pre-edit"),
            LifecyclePoint::PreTask => write!(f, "pre-task"),
            LifecyclePoint::PostTask => write!(f, "post-task"),
        }
    }
}

/// Whatever the host knows at a lifecycle point. All fields are optional;
/// hooks treat absent context as a trivial pass.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HookContext {
    pub command: Option<String>,
    pub tool_name: Option<String>,
    pub params: Option<ParamMap>,
    pub file_path: Option<String>,
    pub task_id: Option<String>,
    pub task_description: Option<String>,
    /// Whether the task's output was accepted; consumed at post-task.
    pub outcome_accepted: Option<bool>,
}

impl HookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn tool(mut self, name: impl Into<String>, params: ParamMap) -> Self {
        self.tool_name = Some(name.into());
        self.params = Some(params);
        self
    }

    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn task(mut self, id: impl Into<String>, description: impl Into<String>) -> Self {
        self.task_id = Some(id.into());
        self.task_description = Some(description.into());
        self
    }

    pub fn outcome(mut self, accepted: bool) -> Self {
        self.outcome_accepted = Some(accepted);
        self
    }
}
