//! # warden-kernel-memory
//!
//! Admission control for a shared knowledge store. Before any mutation the
//! host calls [`MemoryWriteGate::evaluate_write`], which runs four
//! independent checks and aggregates them:
//!
//! 1. **Authority** — role- and namespace-gated write capability
//! 2. **Rate** — sliding one-minute window per agent
//! 3. **Overwrite** — replacing an existing key requires `can_overwrite`
//! 4. **Contradiction** — lexical polarity scan against existing values;
//!    advisory only, never blocks on its own
//!
//! The gate also owns confidence decay and TTL expiry for stored entries.
//! It performs no I/O; the store itself lives with the host.

pub mod authority;
pub mod contradiction;
pub mod entry;
pub mod gate;

pub use authority::{AgentRole, WriteAuthority};
pub use contradiction::{detect_contradictions, Contradiction, POLARITY_PAIRS};
pub use entry::{EntryOptions, Lineage, MemoryEntry, MemoryId};
pub use gate::{
    AuthorityCheck, MemoryGateConfig, MemoryWriteGate, OverwriteCheck, RateCheck, WriteDecision,
};
