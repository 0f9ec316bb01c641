//! # warden-kernel-continuation
//!
//! The per-step continuation gate. Once per execution step the host feeds
//! in a `StepContext` snapshot and gets back one of five decisions, in
//! strict priority order: **stop > pause > throttle > checkpoint >
//! continue**.
//!
//! - **stop** — coherence collapse, a long-ignored checkpoint request, or
//!   an exhausted budget dimension
//! - **pause** — rework ratio or uncertainty over their ceilings
//! - **throttle** — token burn rate (least-squares slope of budget fraction
//!   per step) over the configured limit
//! - **checkpoint** — the checkpoint interval elapsed with nothing worse
//!   pending
//!
//! `evaluate_with_history` wraps the decision function with a bounded
//! decision history and a cooldown window that suppresses re-evaluation
//! except for the critical stop conditions.

pub mod context;
pub mod decision;
pub mod gate;
pub mod slope;

pub use context::{RemainingBudget, StepContext};
pub use decision::{
    CoherenceLevel, ContinueDecision, Decision, DecisionMetrics, UncertaintyLevel,
};
pub use gate::{ContinueGate, ContinueGateConfig, GateStats};
pub use slope::SlopeWindow;
