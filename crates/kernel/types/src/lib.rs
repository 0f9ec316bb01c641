//! Core type definitions for the Warden governance kernel.
//!
//! This crate provides the shared vocabulary the kernel components exchange
//! with their host: dynamic tool parameters and their canonical content
//! digest, the multi-dimensional usage budget, run telemetry, and the clock
//! abstraction that keeps every time-dependent decision deterministic under
//! test.

pub mod budget;
pub mod clock;
pub mod events;
pub mod ids;
pub mod params;

// Re-export primary types at crate root for ergonomic use.
pub use budget::{Budget, BudgetDimension, CostMeter, Meter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{OptimizationMetrics, RunEvent, TestSummary};
pub use ids::{AgentId, EventId};
pub use params::{canonical_digest, ParamMap, ParamType, ParamValue};
