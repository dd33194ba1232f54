// Error handling module for the engine
// Crate-level error type for defects and ambient failures
//
// Business rejections (admission failures, shortfalls, impatience) never reach
// this type; they are counted in the shift statistics instead.

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::orders::TransitionError;

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// An order was asked to make an illegal state change
    #[error("Invalid order transition: {0}")]
    InvalidTransition(#[from] TransitionError),

    /// A request failed structural validation
    #[error("{0}")]
    MalformedRequest(String),

    /// Configuration failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cancellation was asked for an order this shift holds no reservation for
    #[error("Unknown order: {0}")]
    UnknownOrder(uuid::Uuid),

    /// A register lane task panicked or was cancelled
    #[error("Lane failed: {0}")]
    LaneFailed(String),
}

impl EngineError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidTransition(_) => "INVALID_TRANSITION",
            EngineError::MalformedRequest(_) => "MALFORMED_REQUEST",
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::Config(_) => "CONFIG_ERROR",
            EngineError::Json(_) => "JSON_ERROR",
            EngineError::Io(_) => "IO_ERROR",
            EngineError::UnknownOrder(_) => "UNKNOWN_ORDER",
            EngineError::LaneFailed(_) => "LANE_FAILED",
        }
    }

    /// Log the error at a level matching its severity
    ///
    /// - error!: engine defects (illegal transitions, failed lanes)
    /// - warn!: bad input from the caller
    /// - debug!: everything else (file and parse problems surface to the user anyway)
    pub fn log(&self) {
        match self {
            EngineError::InvalidTransition(_) | EngineError::LaneFailed(_) => {
                error!(code = self.error_code(), "{}", self)
            }
            EngineError::MalformedRequest(_)
            | EngineError::UnknownOrder(_)
            | EngineError::Validation(_)
            | EngineError::Config(_) => {
                warn!(code = self.error_code(), "{}", self)
            }
            EngineError::Json(_) | EngineError::Io(_) => debug!(code = self.error_code(), "{}", self),
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::OrderState;

    #[test]
    fn test_transition_error_converts() {
        let err: EngineError = TransitionError {
            from: OrderState::Delivered,
            to: OrderState::Cancelled,
        }
        .into();

        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(
            err.to_string(),
            "Invalid order transition: Invalid status transition from delivered to cancelled"
        );
    }

    #[test]
    fn test_unknown_order_code() {
        let err = EngineError::UnknownOrder(uuid::Uuid::nil());
        assert_eq!(err.error_code(), "UNKNOWN_ORDER");
        assert!(err.to_string().starts_with("Unknown order: "));
    }

    #[test]
    fn test_io_error_converts() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "shop.json").into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("shop.json"));
    }
}
