use serde::{Deserialize, Serialize};
use warden_kernel_types::AgentId;

use crate::authority::WriteAuthority;
use crate::contradiction::Contradiction;

/// Unique identifier for a stored entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub uuid::Uuid);

impl MemoryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mem:{}", self.0)
    }
}

/// Where an entry came from. `operation` is "create" unless the writer
/// declares otherwise; derived facts carry their sources.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lineage {
    pub operation: String,
    pub parent: Option<MemoryId>,
    pub derived_from: Vec<MemoryId>,
}

impl Default for Lineage {
    fn default() -> Self {
        Self {
            operation: "create".to_string(),
            parent: None,
            derived_from: Vec::new(),
        }
    }
}

/// One fact in the shared store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: MemoryId,
    pub key: String,
    pub namespace: String,
    pub value: serde_json::Value,
    /// Content hash of the serialized value (lowercase hex).
    pub value_hash: String,
    pub owner: AgentId,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    /// Entry expires once `now - created_at_ms > ttl_ms`. `None` never
    /// expires.
    pub ttl_ms: Option<u64>,
    /// Exponential confidence decay per hour. Zero means no decay.
    pub decay_rate: f64,
    /// Confidence at `updated_at_ms`, in [0, 1].
    pub confidence: f64,
    pub contradictions: Vec<Contradiction>,
    pub lineage: Lineage,
}

impl MemoryEntry {
    pub fn content_hash(value: &serde_json::Value) -> String {
        blake3::hash(value.to_string().as_bytes()).to_hex().to_string()
    }
}

/// Optional knobs for [`crate::MemoryWriteGate::create_memory_entry`].
#[derive(Clone, Debug, Default)]
pub struct EntryOptions {
    pub ttl_ms: Option<u64>,
    pub decay_rate: f64,
    pub confidence: Option<f64>,
    pub operation: Option<String>,
    pub parent: Option<MemoryId>,
    pub derived_from: Vec<MemoryId>,
}

pub(crate) fn build_entry(
    key: &str,
    namespace: &str,
    value: serde_json::Value,
    authority: &WriteAuthority,
    options: EntryOptions,
    now_ms: u64,
) -> MemoryEntry {
    MemoryEntry {
        id: MemoryId::new(),
        key: key.to_string(),
        namespace: namespace.to_string(),
        value_hash: MemoryEntry::content_hash(&value),
        value,
        owner: authority.agent_id.clone(),
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
        ttl_ms: options.ttl_ms,
        decay_rate: options.decay_rate,
        confidence: options.confidence.unwrap_or(1.0).clamp(0.0, 1.0),
        contradictions: Vec::new(),
        lineage: Lineage {
            operation: options.operation.unwrap_or_else(|| "create".to_string()),
            parent: options.parent,
            derived_from: options.derived_from,
        },
    }
}
