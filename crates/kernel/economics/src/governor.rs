use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use warden_kernel_types::{BudgetDimension, Clock, SystemClock};

/// Per-period limits. `None` means unlimited for that dimension.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicLimits {
    pub max_tokens: Option<u64>,
    pub max_tool_calls: Option<u64>,
    pub max_storage_bytes: Option<u64>,
    pub max_time_ms: Option<u64>,
    pub max_cost_usd: Option<f64>,
}

/// Alert tiers, ascending. Thresholds: 75%, 90%, 95%, >100%.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Notice,
    Warning,
    Critical,
    Exceeded,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Notice => write!(f, "NOTICE"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Critical => write!(f, "CRITICAL"),
            AlertSeverity::Exceeded => write!(f, "BUDGET EXCEEDED"),
        }
    }
}

/// One dimension's alert.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub dimension: BudgetDimension,
    pub severity: AlertSeverity,
    /// Fraction of the limit consumed.
    pub utilization: f64,
    pub message: String,
}

/// Result of one budget check.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetReport {
    /// False iff any dimension's usage is strictly over its limit.
    pub within_budget: bool,
    pub alerts: Vec<BudgetAlert>,
}

/// Cost breakdown by source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub token_cost_usd: f64,
    pub tool_call_cost_usd: f64,
    pub total_usd: f64,
}

/// Remaining capacity per dimension, never negative. `None` = unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemainingCapacity {
    pub tokens: Option<u64>,
    pub tool_calls: Option<u64>,
    pub storage_bytes: Option<u64>,
    pub time_ms: Option<u64>,
    pub cost_usd: Option<f64>,
}

/// Pure accumulator over tokens, tool calls, storage, elapsed time, and
/// estimated cost. Leaf component: no dependencies on the other gates.
pub struct EconomicGovernor {
    limits: EconomicLimits,
    tokens_used: u64,
    tool_calls_used: u64,
    storage_bytes_used: u64,
    period_started_ms: u64,
    usd_per_1k_tokens: f64,
    usd_per_tool_call: f64,
    clock: Arc<dyn Clock>,
}

impl EconomicGovernor {
    pub fn new(limits: EconomicLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: EconomicLimits, clock: Arc<dyn Clock>) -> Self {
        let period_started_ms = clock.now_ms();
        Self {
            limits,
            tokens_used: 0,
            tool_calls_used: 0,
            storage_bytes_used: 0,
            period_started_ms,
            usd_per_1k_tokens: 0.003,
            usd_per_tool_call: 0.0,
            clock,
        }
    }

    pub fn with_rates(mut self, usd_per_1k_tokens: f64, usd_per_tool_call: f64) -> Self {
        self.usd_per_1k_tokens = usd_per_1k_tokens.max(0.0);
        self.usd_per_tool_call = usd_per_tool_call.max(0.0);
        self
    }

    pub fn record_token_usage(&mut self, tokens: u64) {
        self.tokens_used = self.tokens_used.saturating_add(tokens);
    }

    pub fn record_tool_call(&mut self) {
        self.tool_calls_used = self.tool_calls_used.saturating_add(1);
    }

    pub fn record_storage_usage(&mut self, bytes: u64) {
        self.storage_bytes_used = self.storage_bytes_used.saturating_add(bytes);
    }

    /// Milliseconds since the period started.
    pub fn elapsed_ms(&self) -> u64 {
        self.clock.now_ms().saturating_sub(self.period_started_ms)
    }

    /// Cost breakdown by source. Token and tool-call costs sum to the total.
    pub fn cost_estimate(&self) -> CostEstimate {
        let token_cost_usd = self.tokens_used as f64 / 1_000.0 * self.usd_per_1k_tokens;
        let tool_call_cost_usd = self.tool_calls_used as f64 * self.usd_per_tool_call;
        CostEstimate {
            token_cost_usd,
            tool_call_cost_usd,
            total_usd: token_cost_usd + tool_call_cost_usd,
        }
    }

    fn dimension_usage(&self) -> [(BudgetDimension, f64, Option<f64>); 5] {
        [
            (
                BudgetDimension::Tokens,
                self.tokens_used as f64,
                self.limits.max_tokens.map(|l| l as f64),
            ),
            (
                BudgetDimension::ToolCalls,
                self.tool_calls_used as f64,
                self.limits.max_tool_calls.map(|l| l as f64),
            ),
            (
                BudgetDimension::Storage,
                self.storage_bytes_used as f64,
                self.limits.max_storage_bytes.map(|l| l as f64),
            ),
            (
                BudgetDimension::Time,
                self.elapsed_ms() as f64,
                self.limits.max_time_ms.map(|l| l as f64),
            ),
            (
                BudgetDimension::Cost,
                self.cost_estimate().total_usd,
                self.limits.max_cost_usd,
            ),
        ]
    }

    /// One-pass budget check across all five dimensions.
    pub fn check_budget(&self) -> BudgetReport {
        let mut alerts = Vec::new();
        let mut within_budget = true;

        for (dimension, used, limit) in self.dimension_usage() {
            let Some(limit) = limit else { continue };
            if limit <= 0.0 {
                continue;
            }
            let utilization = used / limit;

            // Hard verdict is strict >; alert tiers are soft >=.
            if used > limit {
                within_budget = false;
            }

            let severity = if used > limit {
                Some(AlertSeverity::Exceeded)
            } else if utilization >= 0.95 {
                Some(AlertSeverity::Critical)
            } else if utilization >= 0.90 {
                Some(AlertSeverity::Warning)
            } else if utilization >= 0.75 {
                Some(AlertSeverity::Notice)
            } else {
                None
            };

            if let Some(severity) = severity {
                let message = format!(
                    "{severity}: {dimension} at {:.0}% of budget",
                    utilization * 100.0
                );
                if severity >= AlertSeverity::Critical {
                    warn!(%dimension, utilization, "Budget alert: {message}");
                } else {
                    debug!(%dimension, utilization, "Budget alert: {message}");
                }
                alerts.push(BudgetAlert {
                    dimension,
                    severity,
                    utilization,
                    message,
                });
            }
        }

        BudgetReport {
            within_budget,
            alerts,
        }
    }

    /// max(0, limit − used) per dimension; never negative.
    pub fn estimate_remaining_capacity(&self) -> RemainingCapacity {
        RemainingCapacity {
            tokens: self
                .limits
                .max_tokens
                .map(|l| l.saturating_sub(self.tokens_used)),
            tool_calls: self
                .limits
                .max_tool_calls
                .map(|l| l.saturating_sub(self.tool_calls_used)),
            storage_bytes: self
                .limits
                .max_storage_bytes
                .map(|l| l.saturating_sub(self.storage_bytes_used)),
            time_ms: self
                .limits
                .max_time_ms
                .map(|l| l.saturating_sub(self.elapsed_ms())),
            cost_usd: self
                .limits
                .max_cost_usd
                .map(|l| (l - self.cost_estimate().total_usd).max(0.0)),
        }
    }

    /// Zero usage and restart the time-tracking origin. Limits persist.
    pub fn reset_period(&mut self) {
        self.tokens_used = 0;
        self.tool_calls_used = 0;
        self.storage_bytes_used = 0;
        self.period_started_ms = self.clock.now_ms();
        debug!("Accounting period reset");
    }

    pub fn limits(&self) -> EconomicLimits {
        self.limits
    }
}
