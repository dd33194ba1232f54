// Error types for the business rules
// Admission failures and the rejection kinds counted in shift statistics

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::money::Cents;
use crate::orders::PaymentMethod;

/// Why an order request was not admitted
///
/// Every variant except `Malformed` is an expected business outcome; the
/// dispatcher turns those into statistics. `Malformed` means the caller built
/// an invalid request and is propagated as a defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Request failed structural validation (no items, zero quantity, bad promo code)
    #[error("Malformed order request: {0}")]
    Malformed(String),

    #[error("Shop is closed at {at} (open {open_hour}:00-{close_hour}:00)")]
    OutsideHours {
        at: NaiveTime,
        open_hour: u32,
        close_hour: u32,
    },

    #[error("Menu item {item_id} is unavailable: {reason}")]
    ItemUnavailable {
        item_id: String,
        reason: String,
    },

    #[error("Payment method {method} is not accepted: {reason}")]
    InvalidPaymentMethod {
        method: PaymentMethod,
        reason: String,
    },

    /// The external payment authorizer refused the method
    #[error("Payment with {method} was declined")]
    PaymentDeclined { method: PaymentMethod },

    #[error("Delivery distance {distance_m}m exceeds the {max_distance_m}m radius")]
    DeliveryTooFar {
        distance_m: u32,
        max_distance_m: u32,
    },

    #[error("Subtotal {subtotal} is below the delivery minimum {minimum}")]
    BelowDeliveryMinimum {
        subtotal: Cents,
        minimum: Cents,
    },

    #[error("Quantity {quantity} of {item_id} exceeds the maximum of {max}")]
    QuantityTooHigh {
        item_id: String,
        quantity: u32,
        max: u32,
    },
}

impl AdmissionError {
    /// Statistics bucket for business rejections; `None` for defects
    pub fn kind(&self) -> Option<RejectionKind> {
        match self {
            AdmissionError::Malformed(_) => None,
            AdmissionError::OutsideHours { .. } => Some(RejectionKind::OutsideHours),
            AdmissionError::ItemUnavailable { .. } => Some(RejectionKind::ItemUnavailable),
            AdmissionError::InvalidPaymentMethod { .. } => Some(RejectionKind::InvalidPaymentMethod),
            AdmissionError::PaymentDeclined { .. } => Some(RejectionKind::PaymentDeclined),
            AdmissionError::DeliveryTooFar { .. } => Some(RejectionKind::DeliveryTooFar),
            AdmissionError::BelowDeliveryMinimum { .. } => Some(RejectionKind::BelowDeliveryMinimum),
            AdmissionError::QuantityTooHigh { .. } => Some(RejectionKind::QuantityTooHigh),
        }
    }
}

/// Reason a customer left without being served
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    OutsideHours,
    ItemUnavailable,
    InvalidPaymentMethod,
    PaymentDeclined,
    DeliveryTooFar,
    BelowDeliveryMinimum,
    QuantityTooHigh,
    InsufficientResource,
    PatienceExceeded,
    /// Still queued when the shift closed
    ShopClosed,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::OutsideHours => "outside_hours",
            RejectionKind::ItemUnavailable => "item_unavailable",
            RejectionKind::InvalidPaymentMethod => "invalid_payment_method",
            RejectionKind::PaymentDeclined => "payment_declined",
            RejectionKind::DeliveryTooFar => "delivery_too_far",
            RejectionKind::BelowDeliveryMinimum => "below_delivery_minimum",
            RejectionKind::QuantityTooHigh => "quantity_too_high",
            RejectionKind::InsufficientResource => "insufficient_resource",
            RejectionKind::PatienceExceeded => "patience_exceeded",
            RejectionKind::ShopClosed => "shop_closed",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AdmissionError::OutsideHours {
            at: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            open_hour: 7,
            close_hour: 19,
        };
        assert_eq!(error.to_string(), "Shop is closed at 06:30:00 (open 7:00-19:00)");

        let error = AdmissionError::BelowDeliveryMinimum {
            subtotal: Cents::new(450),
            minimum: Cents::new(1500),
        };
        assert_eq!(error.to_string(), "Subtotal $4.50 is below the delivery minimum $15.00");
    }

    #[test]
    fn test_malformed_has_no_kind() {
        assert_eq!(AdmissionError::Malformed("empty".to_string()).kind(), None);
        assert_eq!(
            AdmissionError::DeliveryTooFar { distance_m: 9000, max_distance_m: 5000 }.kind(),
            Some(RejectionKind::DeliveryTooFar)
        );
    }

    #[test]
    fn test_rejection_kind_serialization() {
        let json = serde_json::to_string(&RejectionKind::PatienceExceeded).unwrap();
        assert_eq!(json, "\"patience_exceeded\"");
        assert_eq!(RejectionKind::ShopClosed.to_string(), "shop_closed");
    }
}
