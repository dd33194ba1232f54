use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::orders::PaymentMethod;
use crate::validation::validate_promo_code;

/// Item and quantity requested by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RequestedItem {
    #[validate(length(min = 1, message = "Item id must not be empty"))]
    pub item_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// Delivery details; absent for counter pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    /// Distance from the shop, metres
    pub distance_m: u32,
}

/// What a customer asks for before admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_order_request"))]
pub struct OrderRequest {
    #[validate]
    pub items: Vec<RequestedItem>,
    pub payment: PaymentMethod,
    #[serde(default)]
    pub delivery: Option<DeliveryRequest>,
    #[serde(default)]
    pub promo_code: Option<String>,
}

fn validate_order_request(request: &OrderRequest) -> Result<(), ValidationError> {
    if request.items.is_empty() {
        let mut error = ValidationError::new("empty_order");
        error.message = Some("Order must contain at least one item".into());
        return Err(error);
    }
    match request.promo_code.as_deref() {
        Some(code) => validate_promo_code(code),
        None => Ok(()),
    }
}

impl OrderRequest {
    /// Pickup order paid with `payment`
    pub fn pickup(payment: PaymentMethod, items: impl IntoIterator<Item = (&'static str, u32)>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|(item_id, quantity)| RequestedItem {
                    item_id: item_id.to_string(),
                    quantity,
                })
                .collect(),
            payment,
            delivery: None,
            promo_code: None,
        }
    }

    pub fn with_delivery(mut self, distance_m: u32) -> Self {
        self.delivery = Some(DeliveryRequest { distance_m });
        self
    }

    pub fn with_promo_code(mut self, code: impl Into<String>) -> Self {
        self.promo_code = Some(code.into());
        self
    }
}
