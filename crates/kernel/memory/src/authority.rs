use serde::{Deserialize, Serialize};
use warden_kernel_types::AgentId;

/// Role of a writing agent. Write capability is role-gated first and
/// namespace-gated second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    /// Read-only participant; never writes regardless of namespaces.
    Observer,
    Worker,
    Coordinator,
    /// Unlimited namespace access.
    Queen,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentRole::Observer => write!(f, "observer"),
            AgentRole::Worker => write!(f, "worker"),
            AgentRole::Coordinator => write!(f, "coordinator"),
            AgentRole::Queen => write!(f, "queen"),
        }
    }
}

/// What one agent is allowed to do to the shared store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriteAuthority {
    pub agent_id: AgentId,
    pub role: AgentRole,
    /// Namespaces this agent may write to. Ignored for queen (all) and
    /// observer (none).
    pub namespaces: Vec<String>,
    pub max_writes_per_minute: u32,
    pub can_delete: bool,
    pub can_overwrite: bool,
    /// Trust in [0, 1]; advisory weight, carried with the authority.
    pub trust_level: f64,
}

impl WriteAuthority {
    pub fn new(agent_id: impl Into<AgentId>, role: AgentRole) -> Self {
        Self {
            agent_id: agent_id.into(),
            role,
            namespaces: Vec::new(),
            max_writes_per_minute: 60,
            can_delete: false,
            can_overwrite: false,
            trust_level: 0.5,
        }
    }

    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespaces.push(ns.into());
        self
    }

    pub fn max_writes_per_minute(mut self, limit: u32) -> Self {
        self.max_writes_per_minute = limit;
        self
    }

    pub fn can_overwrite(mut self, allowed: bool) -> Self {
        self.can_overwrite = allowed;
        self
    }

    pub fn can_delete(mut self, allowed: bool) -> Self {
        self.can_delete = allowed;
        self
    }

    pub fn trust_level(mut self, trust: f64) -> Self {
        self.trust_level = trust.clamp(0.0, 1.0);
        self
    }

    /// Role/namespace admission. Queen writes anywhere, observer nowhere,
    /// worker and coordinator only inside their granted namespaces.
    pub fn may_write(&self, namespace: &str) -> bool {
        match self.role {
            AgentRole::Queen => true,
            AgentRole::Observer => false,
            AgentRole::Worker | AgentRole::Coordinator => {
                self.namespaces.iter().any(|ns| ns == namespace)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queen_writes_to_any_namespace() {
        let auth = WriteAuthority::new("queen-1", AgentRole::Queen);
        assert!(auth.may_write("anything"));
    }

    #[test]
    fn observer_never_writes() {
        let auth = WriteAuthority::new("obs-1", AgentRole::Observer).namespace("shared");
        assert!(!auth.may_write("shared"));
    }

    #[test]
    fn worker_is_namespace_scoped() {
        let auth = WriteAuthority::new("w-1", AgentRole::Worker).namespace("tasks");
        assert!(auth.may_write("tasks"));
        assert!(!auth.may_write("secrets"));
    }

    #[test]
    fn trust_level_is_clamped() {
        let auth = WriteAuthority::new("w-1", AgentRole::Worker).trust_level(2.0);
        assert!((auth.trust_level - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn role_display() {
        assert_eq!(AgentRole::Coordinator.to_string(), "coordinator");
        assert_eq!(AgentRole::Queen.to_string(), "queen");
    }
}
