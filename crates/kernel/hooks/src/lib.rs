//! # warden-kernel-hooks
//!
//! The lifecycle boundary between a host runtime and the kernel. The host
//! invokes [`HookEngine`] at five points — pre-command, pre-tool-use,
//! pre-edit, pre-task, post-task — passing whatever context it has. Every
//! hook returns the same uniform [`HookResult`]; missing context is a
//! trivial success, never an error.
//!
//! Pre-task classifies the task's intent from free text and opens a run
//! record; post-task closes that record into a [`RunEvent`] for the
//! external ledger.
//!
//! [`RunEvent`]: warden_kernel_types::RunEvent

pub mod context;
pub mod engine;
pub mod intent;
pub mod result;
pub mod tracker;

pub use context::{HookContext, LifecyclePoint};
pub use engine::HookEngine;
pub use intent::classify_intent;
pub use result::HookResult;
pub use tracker::RunTracker;
