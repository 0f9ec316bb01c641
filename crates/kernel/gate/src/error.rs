use thiserror::Error;

/// Errors from gateway configuration and registration.
///
/// Admission outcomes are never errors; they are `GatewayDecision` values.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("schema already registered for tool: {0}")]
    DuplicateSchema(String),

    #[error("schema not found for tool: {0}")]
    SchemaNotFound(String),
}
