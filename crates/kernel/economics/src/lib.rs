//! # warden-kernel-economics
//!
//! Usage and cost accounting for an agent's accounting period. The governor
//! is a pure accumulator: the host records token, tool-call, and storage
//! usage as it happens; elapsed time is tracked from instantiation (or the
//! last period reset) against the injected clock.
//!
//! `check_budget` emits tiered alerts per dimension — NOTICE at 75%,
//! WARNING at 90%, CRITICAL at 95%, BUDGET EXCEEDED above 100% — all in one
//! pass, so several dimensions may alert simultaneously. Alerting is soft
//! (`>=` thresholds); the hard `within_budget` verdict stays strict (`>`),
//! so alerts are advance warnings of an impending block, never the block
//! itself.

pub mod governor;

pub use governor::{
    AlertSeverity, BudgetAlert, BudgetReport, CostEstimate, EconomicGovernor, EconomicLimits,
    RemainingCapacity,
};
