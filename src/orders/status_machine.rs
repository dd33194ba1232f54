use chrono::NaiveDateTime;

use crate::orders::{Order, OrderState, TransitionError, TransitionRecord};

/// Service for managing order state transitions
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid
    ///
    /// # Valid Transitions
    /// - New → Paid, Cancelled
    /// - Paid → Preparing, Cancelled
    /// - Preparing → Ready, Cancelled
    /// - Ready → Delivered
    /// - Delivered, Cancelled → (terminal)
    ///
    /// Moving to the current state again is not a transition and is rejected.
    pub fn is_valid_transition(from: OrderState, to: OrderState) -> bool {
        matches!(
            (from, to),
            (OrderState::New, OrderState::Paid)
                | (OrderState::New, OrderState::Cancelled)
                | (OrderState::Paid, OrderState::Preparing)
                | (OrderState::Paid, OrderState::Cancelled)
                | (OrderState::Preparing, OrderState::Ready)
                | (OrderState::Preparing, OrderState::Cancelled)
                | (OrderState::Ready, OrderState::Delivered)
        )
    }

    /// States reachable in one step from `from`
    pub fn targets(from: OrderState) -> Vec<OrderState> {
        OrderState::ALL
            .into_iter()
            .filter(|to| Self::is_valid_transition(from, *to))
            .collect()
    }

    /// Move `order` to `to`, stamping the timeline with `at`
    ///
    /// # Returns
    /// `Ok(())` after the move, or `TransitionError` naming the current and
    /// attempted state. A rejected transition leaves the order untouched.
    pub fn transition(order: &mut Order, to: OrderState, at: NaiveDateTime) -> Result<(), TransitionError> {
        let from = order.state;
        if !Self::is_valid_transition(from, to) {
            return Err(TransitionError { from, to });
        }

        order.state = to;
        order.timeline.push(TransitionRecord { from, to, at });
        tracing::trace!(order_id = %order.id(), "Order moved {} -> {}", from, to);
        Ok(())
    }
}
