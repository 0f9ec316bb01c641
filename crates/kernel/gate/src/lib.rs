//! # warden-kernel-gate
//!
//! Tool-call admission gateway. Every tool invocation passes through
//! `ToolGateway::evaluate` before execution and `ToolGateway::record_call`
//! after. The blocking pipeline is strictly ordered and short-circuits on
//! the first failure:
//!
//! 1. **Schema validation** — declared parameter contracts
//! 2. **Budget check** — five-dimensional usage ledger
//! 3. **Enforcement gates** — injected policy collaborator
//!
//! A content-addressed idempotency cache sits in front of the pipeline: a
//! fresh hit replays the recorded result without re-running any gate, so
//! enforcement collaborators are never re-invoked for a deduplicated call.
//!
//! The gateway never panics and never blocks; every outcome is a typed
//! `GatewayDecision`.

pub mod decision;
pub mod error;
pub mod gateway;
pub mod schema;
pub mod traits;

pub use decision::{CallRecord, DecidingGate, GatewayDecision};
pub use error::GatewayError;
pub use gateway::{GatewayConfig, ToolGateway};
pub use schema::{SchemaValidation, ToolSchema};
pub use traits::{
    most_restrictive, EnforcementDecision, EnforcementProvider, EnforcementVerdict,
};
