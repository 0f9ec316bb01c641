use serde::{Deserialize, Serialize};

/// Fixed component weights for the overall score.
pub const VIOLATION_WEIGHT: f64 = 0.4;
pub const REWORK_WEIGHT: f64 = 0.3;
pub const DRIFT_WEIGHT: f64 = 0.3;

/// Health snapshot at one point in time. All components lie in [0, 1];
/// `overall` is always the fixed weighted sum of the three components.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoherenceScore {
    pub overall: f64,
    pub violation_component: f64,
    pub rework_component: f64,
    pub drift_component: f64,
    pub computed_at_ms: u64,
    /// Number of events the drift component actually saw.
    pub window_size: usize,
}

impl CoherenceScore {
    pub fn new(
        violation_component: f64,
        rework_component: f64,
        drift_component: f64,
        computed_at_ms: u64,
        window_size: usize,
    ) -> Self {
        let violation_component = violation_component.clamp(0.0, 1.0);
        let rework_component = rework_component.clamp(0.0, 1.0);
        let drift_component = drift_component.clamp(0.0, 1.0);
        Self {
            overall: VIOLATION_WEIGHT * violation_component
                + REWORK_WEIGHT * rework_component
                + DRIFT_WEIGHT * drift_component,
            violation_component,
            rework_component,
            drift_component,
            computed_at_ms,
            window_size,
        }
    }
}

/// Discrete permission tier derived from the coherence score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrivilegeLevel {
    Suspended,
    ReadOnly,
    Restricted,
    Full,
}

impl std::fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivilegeLevel::Full => write!(f, "full"),
            PrivilegeLevel::Restricted => write!(f, "restricted"),
            PrivilegeLevel::ReadOnly => write!(f, "read-only"),
            PrivilegeLevel::Suspended => write!(f, "suspended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_is_weighted_sum() {
        let score = CoherenceScore::new(0.5, 0.5, 1.0, 0, 10);
        assert!((score.overall - 0.65).abs() < 1e-12);
    }

    #[test]
    fn components_clamped_at_construction() {
        let score = CoherenceScore::new(1.5, -0.2, 0.5, 0, 1);
        assert_eq!(score.violation_component, 1.0);
        assert_eq!(score.rework_component, 0.0);
        assert!((score.overall - (0.4 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn privilege_levels_are_ordered() {
        assert!(PrivilegeLevel::Suspended < PrivilegeLevel::ReadOnly);
        assert!(PrivilegeLevel::ReadOnly < PrivilegeLevel::Restricted);
        assert!(PrivilegeLevel::Restricted < PrivilegeLevel::Full);
    }

    #[test]
    fn privilege_display() {
        assert_eq!(PrivilegeLevel::ReadOnly.to_string(), "read-only");
        assert_eq!(PrivilegeLevel::Full.to_string(), "full");
    }
}
