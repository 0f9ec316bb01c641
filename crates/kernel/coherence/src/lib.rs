//! # warden-kernel-coherence
//!
//! Agent health scoring. The scheduler folds three signals from the recent
//! run-event window into one weighted coherence score:
//!
//! - **violation component** — policy violations per window, clamped to [0, 10]
//! - **rework component** — average reworked lines, clamped to [0, 100]
//! - **drift component** — dispersion of task intents across the window
//!
//! `overall = 0.4·violation + 0.3·rework + 0.3·drift`, all in [0, 1].
//!
//! The score maps through ordered thresholds to a discrete privilege level
//! (full / restricted / read-only / suspended); scores accumulate in a
//! bounded history so the host can trend them.

pub mod error;
pub mod scheduler;
pub mod score;

pub use error::CoherenceError;
pub use scheduler::{CoherenceScheduler, CoherenceThresholds, SchedulerConfig};
pub use score::{CoherenceScore, PrivilegeLevel};
