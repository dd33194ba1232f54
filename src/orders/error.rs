use crate::orders::OrderState;

/// Illegal order state transition
///
/// Raised only by integration mistakes; the dispatcher never requests an
/// illegal move, so callers should treat this as a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status transition from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderState,
    pub to: OrderState,
}
