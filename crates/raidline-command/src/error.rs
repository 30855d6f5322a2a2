//! Error types for the command interpreter.

use crate::types::Field;

/// A reply that could not be applied to the current dialogue step.
///
/// The conversation state is left untouched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("A {0} is required.")]
    Required(Field),
    #[error("{0}")]
    Invalid(String),
    #[error("This conversation is already complete.")]
    AlreadyComplete,
}

/// Transport-level failures of the item-management API.
///
/// A reported failure (`success: false`) is not an `ApiError`; it arrives as
/// an [`ApiResponse`](crate::api::ApiResponse).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that escape the execution gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("upstream call failed: {0}")]
    Upstream(#[from] ApiError),
}
