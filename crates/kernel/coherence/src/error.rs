use thiserror::Error;

/// Errors from coherence scheduler configuration.
#[derive(Error, Debug)]
pub enum CoherenceError {
    #[error(
        "thresholds must be ordered read_only < warning < healthy \
         (got {read_only} / {warning} / {healthy})"
    )]
    InvalidThresholds {
        read_only: f64,
        warning: f64,
        healthy: f64,
    },
}
