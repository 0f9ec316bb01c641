use serde::{Deserialize, Serialize};

/// Uniform result returned from every lifecycle hook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HookResult {
    pub success: bool,
    /// The host must stop the surrounding operation.
    pub abort: bool,
    pub message: Option<String>,
    pub warnings: Vec<String>,
    /// Hook-specific payload, e.g. the classified intent at pre-task.
    pub data: Option<serde_json::Value>,
}

impl HookResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            abort: false,
            message: None,
            warnings: Vec::new(),
            data: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self {
            success: false,
            abort: true,
            message: Some(message.into()),
            warnings: Vec::new(),
            data: None,
        }
    }

    pub fn warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
