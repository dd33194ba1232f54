// Admission Controller
//
// Decides, before any resource is touched, whether an order request may enter
// the fulfilment pipeline. Guards run in a fixed order and the first failure wins.

use crate::business_rules::error::AdmissionError;
use crate::business_rules::pricing::PricingEngine;
use crate::catalog::MenuCatalog;
use crate::clock::Clock;
use crate::inventory::ResourceMap;
use crate::money::Cents;
use crate::orders::{LineItem, OrderRequest, PaymentMethod};
use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Opening hours, `open_hour <= hour < close_hour`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_shop_hours"))]
pub struct ShopHours {
    #[validate(range(max = 23))]
    pub open_hour: u32,
    #[validate(range(min = 1, max = 24))]
    pub close_hour: u32,
}

fn validate_shop_hours(hours: &ShopHours) -> Result<(), ValidationError> {
    if hours.open_hour < hours.close_hour {
        Ok(())
    } else {
        Err(ValidationError::new("open_hour_must_precede_close_hour"))
    }
}

impl ShopHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        (self.open_hour..self.close_hour).contains(&time.hour())
    }
}

/// Delivery limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPolicy {
    pub max_distance_m: u32,
    pub minimum_subtotal: Cents,
}

/// Admission configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdmissionPolicy {
    #[validate]
    pub hours: ShopHours,
    #[validate(length(min = 1, message = "At least one payment method must be accepted"))]
    pub accepted_payments: Vec<PaymentMethod>,
    pub delivery: DeliveryPolicy,
    /// Anti-abuse bound on the quantity of any single item
    #[validate(range(min = 1))]
    pub max_quantity_per_item: u32,
}

/// External pass/fail payment capability
pub trait PaymentAuthorizer: Send + Sync {
    fn authorize(&self, method: PaymentMethod, amount: Cents) -> bool;
}

/// Authorizer that approves every payment
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl PaymentAuthorizer for ApproveAll {
    fn authorize(&self, _method: PaymentMethod, _amount: Cents) -> bool {
        true
    }
}

/// An admitted request, resolved against the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admitted {
    /// Catalog-priced lines in request order
    pub line_items: Vec<LineItem>,
    pub subtotal: Cents,
    /// Resources the whole order consumes
    pub requirements: ResourceMap,
    /// Brew time for the whole order
    pub prep_time: Duration,
}

/// Admission Controller
///
/// Pure validation: never touches the ledger or any order.
pub struct AdmissionController {
    policy: AdmissionPolicy,
    catalog: Arc<dyn MenuCatalog>,
    clock: Arc<dyn Clock>,
    authorizer: Arc<dyn PaymentAuthorizer>,
}

impl AdmissionController {
    /// Create a new AdmissionController that approves every payment
    pub fn new(policy: AdmissionPolicy, catalog: Arc<dyn MenuCatalog>, clock: Arc<dyn Clock>) -> Self {
        Self::with_authorizer(policy, catalog, clock, Arc::new(ApproveAll))
    }

    /// Create a new AdmissionController with an external payment authorizer
    pub fn with_authorizer(
        policy: AdmissionPolicy,
        catalog: Arc<dyn MenuCatalog>,
        clock: Arc<dyn Clock>,
        authorizer: Arc<dyn PaymentAuthorizer>,
    ) -> Self {
        Self {
            policy,
            catalog,
            clock,
            authorizer,
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Validate a request against every guard
    ///
    /// Guard order:
    /// 1. structural validation (defect, `Malformed`)
    /// 2. shop hours
    /// 3. items exist and are available
    /// 4. payment method accepted and authorized
    /// 5. delivery radius, minimum and payment
    /// 6. per-item quantity bound
    pub fn admit(&self, request: &OrderRequest) -> Result<Admitted, AdmissionError> {
        request
            .validate()
            .map_err(|e| AdmissionError::Malformed(e.to_string()))?;

        self.check_hours(self.clock.now().time())?;
        let admitted = self.resolve_items(request)?;
        self.check_payment(request.payment, admitted.subtotal)?;
        if let Some(delivery) = &request.delivery {
            self.check_delivery(delivery.distance_m, admitted.subtotal, request.payment)?;
        }
        self.check_quantities(request)?;

        Ok(admitted)
    }

    fn check_hours(&self, now: NaiveTime) -> Result<(), AdmissionError> {
        let hours = self.policy.hours;
        if hours.contains(now) {
            Ok(())
        } else {
            Err(AdmissionError::OutsideHours {
                at: now,
                open_hour: hours.open_hour,
                close_hour: hours.close_hour,
            })
        }
    }

    /// Look up every requested item and total its price, recipe and brew time
    fn resolve_items(&self, request: &OrderRequest) -> Result<Admitted, AdmissionError> {
        let mut line_items = Vec::with_capacity(request.items.len());
        let mut requirements = ResourceMap::new();
        let mut prep_seconds: i64 = 0;

        for requested in &request.items {
            let item = self
                .catalog
                .lookup(&requested.item_id)
                .ok_or_else(|| AdmissionError::ItemUnavailable {
                    item_id: requested.item_id.clone(),
                    reason: "Not on the menu".to_string(),
                })?;

            if !item.is_available() {
                return Err(AdmissionError::ItemUnavailable {
                    item_id: requested.item_id.clone(),
                    reason: format!("Item is {}", item.status),
                });
            }

            requirements.add(&item.recipe.times(requested.quantity));
            prep_seconds += i64::from(item.prep_seconds) * i64::from(requested.quantity);
            line_items.push(LineItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                unit_price: item.price,
                quantity: requested.quantity,
            });
        }

        Ok(Admitted {
            subtotal: PricingEngine::subtotal(&line_items),
            line_items,
            requirements,
            prep_time: Duration::seconds(prep_seconds),
        })
    }

    fn check_payment(&self, method: PaymentMethod, amount: Cents) -> Result<(), AdmissionError> {
        if !self.policy.accepted_payments.contains(&method) {
            return Err(AdmissionError::InvalidPaymentMethod {
                method,
                reason: "Not accepted at this shop".to_string(),
            });
        }
        if !self.authorizer.authorize(method, amount) {
            return Err(AdmissionError::PaymentDeclined { method });
        }
        Ok(())
    }

    fn check_delivery(&self, distance_m: u32, subtotal: Cents, method: PaymentMethod) -> Result<(), AdmissionError> {
        let delivery = self.policy.delivery;
        if distance_m > delivery.max_distance_m {
            return Err(AdmissionError::DeliveryTooFar {
                distance_m,
                max_distance_m: delivery.max_distance_m,
            });
        }
        if subtotal < delivery.minimum_subtotal {
            return Err(AdmissionError::BelowDeliveryMinimum {
                subtotal,
                minimum: delivery.minimum_subtotal,
            });
        }
        match method {
            PaymentMethod::Cash => Err(AdmissionError::InvalidPaymentMethod {
                method,
                reason: "Cash is not accepted for delivery".to_string(),
            }),
            PaymentMethod::Card | PaymentMethod::MobileWallet | PaymentMethod::GiftCard => Ok(()),
        }
    }

    /// Quantities are summed per item so splitting a line cannot dodge the bound
    fn check_quantities(&self, request: &OrderRequest) -> Result<(), AdmissionError> {
        let max = self.policy.max_quantity_per_item;
        let mut per_item: BTreeMap<&str, u32> = BTreeMap::new();
        for requested in &request.items {
            let total = per_item.entry(requested.item_id.as_str()).or_insert(0);
            // A sum past u32::MAX is over any bound
            *total = total.checked_add(requested.quantity).unwrap_or(u32::MAX);
        }

        // Report the first offending item in request order
        for requested in &request.items {
            let quantity = per_item[requested.item_id.as_str()];
            if quantity > max {
                return Err(AdmissionError::QuantityTooHigh {
                    item_id: requested.item_id.clone(),
                    quantity,
                    max,
                });
            }
        }
        Ok(())
    }
}
