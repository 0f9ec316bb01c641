use serde::{Deserialize, Serialize};

/// One counted sub-budget. `limit = None` means unlimited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    pub used: u64,
    pub limit: Option<u64>,
}

impl Meter {
    pub fn limited(limit: u64) -> Self {
        Self {
            used: 0,
            limit: Some(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn add(&mut self, delta: u64) {
        self.used = self.used.saturating_add(delta);
    }

    /// Hard-block predicate: strictly over the limit. `used == limit` is
    /// not exceeded; alerting uses `utilization` separately.
    pub fn exceeded(&self) -> bool {
        self.limit.is_some_and(|l| self.used > l)
    }

    /// Remaining capacity, never negative. `None` when unlimited.
    pub fn remaining(&self) -> Option<u64> {
        self.limit.map(|l| l.saturating_sub(self.used))
    }

    /// Fraction of the limit consumed. `None` when unlimited or the limit
    /// is zero.
    pub fn utilization(&self) -> Option<f64> {
        match self.limit {
            Some(l) if l > 0 => Some(self.used as f64 / l as f64),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

/// The cost sub-budget, accounted in USD.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostMeter {
    pub used: f64,
    pub limit: Option<f64>,
}

impl CostMeter {
    pub fn limited(limit: f64) -> Self {
        Self {
            used: 0.0,
            limit: Some(limit),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn add(&mut self, delta: f64) {
        self.used += delta.max(0.0);
    }

    pub fn exceeded(&self) -> bool {
        self.limit.is_some_and(|l| self.used > l)
    }

    pub fn remaining(&self) -> Option<f64> {
        self.limit.map(|l| (l - self.used).max(0.0))
    }

    pub fn utilization(&self) -> Option<f64> {
        match self.limit {
            Some(l) if l > 0.0 => Some(self.used / l),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.used = 0.0;
    }
}

/// The five budget dimensions the kernel accounts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetDimension {
    Tokens,
    ToolCalls,
    Storage,
    Time,
    Cost,
}

impl BudgetDimension {
    pub const ALL: [BudgetDimension; 5] = [
        BudgetDimension::Tokens,
        BudgetDimension::ToolCalls,
        BudgetDimension::Storage,
        BudgetDimension::Time,
        BudgetDimension::Cost,
    ];
}

impl std::fmt::Display for BudgetDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetDimension::Tokens => write!(f, "tokens"),
            BudgetDimension::ToolCalls => write!(f, "tool calls"),
            BudgetDimension::Storage => write!(f, "storage"),
            BudgetDimension::Time => write!(f, "time"),
            BudgetDimension::Cost => write!(f, "cost"),
        }
    }
}

/// Mutable usage ledger with five sub-budgets.
///
/// Limits are immutable across an accounting period; `reset` zeroes `used`
/// fields only. Cloning yields an independent snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub tokens: Meter,
    pub tool_calls: Meter,
    pub storage_bytes: Meter,
    pub time_ms: Meter,
    pub cost_usd: CostMeter,
}

impl Budget {
    /// A budget with every dimension unlimited.
    pub fn unlimited() -> Self {
        Self::default()
    }

    fn dimension_exceeded(&self, dim: BudgetDimension) -> bool {
        match dim {
            BudgetDimension::Tokens => self.tokens.exceeded(),
            BudgetDimension::ToolCalls => self.tool_calls.exceeded(),
            BudgetDimension::Storage => self.storage_bytes.exceeded(),
            BudgetDimension::Time => self.time_ms.exceeded(),
            BudgetDimension::Cost => self.cost_usd.exceeded(),
        }
    }

    /// Dimensions whose `used` is strictly over the limit.
    pub fn exceeded_dimensions(&self) -> Vec<BudgetDimension> {
        BudgetDimension::ALL
            .into_iter()
            .filter(|d| self.dimension_exceeded(*d))
            .collect()
    }

    pub fn within_budget(&self) -> bool {
        self.exceeded_dimensions().is_empty()
    }

    /// Zero all `used` fields, preserving limits.
    pub fn reset(&mut self) {
        self.tokens.reset();
        self.tool_calls.reset();
        self.storage_bytes.reset();
        self.time_ms.reset();
        self.cost_usd.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_limit_is_not_exceeded() {
        let mut m = Meter::limited(100);
        m.add(100);
        assert!(!m.exceeded());
        m.add(1);
        assert!(m.exceeded());
    }

    #[test]
    fn unlimited_never_exceeds() {
        let mut m = Meter::unlimited();
        m.add(u64::MAX);
        assert!(!m.exceeded());
        assert_eq!(m.remaining(), None);
    }

    #[test]
    fn remaining_never_negative() {
        let mut m = Meter::limited(10);
        m.add(25);
        assert_eq!(m.remaining(), Some(0));

        let mut c = CostMeter::limited(1.0);
        c.add(3.0);
        assert_eq!(c.remaining(), Some(0.0));
    }

    #[test]
    fn exceeded_dimensions_named() {
        let mut budget = Budget {
            tokens: Meter::limited(10),
            time_ms: Meter::limited(1_000),
            ..Budget::unlimited()
        };
        budget.tokens.add(11);
        budget.time_ms.add(2_000);

        let exceeded = budget.exceeded_dimensions();
        assert_eq!(
            exceeded,
            vec![BudgetDimension::Tokens, BudgetDimension::Time]
        );
        assert!(!budget.within_budget());
    }

    #[test]
    fn reset_preserves_limits() {
        let mut budget = Budget {
            tokens: Meter::limited(500),
            cost_usd: CostMeter::limited(2.5),
            ..Budget::unlimited()
        };
        budget.tokens.add(400);
        budget.cost_usd.add(1.0);
        budget.reset();

        assert_eq!(budget.tokens.used, 0);
        assert_eq!(budget.tokens.limit, Some(500));
        assert_eq!(budget.cost_usd.used, 0.0);
        assert_eq!(budget.cost_usd.limit, Some(2.5));
    }

    #[test]
    fn clone_is_independent() {
        let mut budget = Budget {
            tokens: Meter::limited(100),
            ..Budget::unlimited()
        };
        let mut snapshot = budget.clone();
        snapshot.tokens.add(99);
        assert_eq!(budget.tokens.used, 0);
        budget.tokens.add(1);
        assert_eq!(snapshot.tokens.used, 99);
    }
}
