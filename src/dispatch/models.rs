use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::business_rules::{MembershipTier, PricingContext};
use crate::inventory::ResourceMap;
use crate::money::Cents;
use crate::orders::{OrderRequest, OrderState};

/// Point at which a customer withdraws an order they already placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPoint {
    /// Right after paying
    AfterPayment,
    /// While the drink is being made
    WhilePreparing,
}

impl CancelPoint {
    /// State the order is in when the customer cancels
    pub fn state(&self) -> OrderState {
        match self {
            CancelPoint::AfterPayment => OrderState::Paid,
            CancelPoint::WhilePreparing => OrderState::Preparing,
        }
    }
}

/// A queued customer; lives for one pass through the dispatch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub is_vip: bool,
    /// Longest wait tolerated before walking out
    pub patience: Duration,
    pub arrived_at: NaiveDateTime,
    pub membership: MembershipTier,
    /// Orders placed on earlier visits
    pub loyalty_orders: u32,
    pub request: OrderRequest,
    pub cancel_at: Option<CancelPoint>,
}

impl Customer {
    pub fn new(name: impl Into<String>, arrived_at: NaiveDateTime, request: OrderRequest) -> Self {
        Self {
            name: name.into(),
            is_vip: false,
            patience: Duration::minutes(10),
            arrived_at,
            membership: MembershipTier::None,
            loyalty_orders: 0,
            request,
            cancel_at: None,
        }
    }

    pub fn vip(mut self) -> Self {
        self.is_vip = true;
        self
    }

    pub fn with_patience(mut self, patience: Duration) -> Self {
        self.patience = patience;
        self
    }

    pub fn with_membership(mut self, membership: MembershipTier) -> Self {
        self.membership = membership;
        self
    }

    pub fn with_loyalty_orders(mut self, orders: u32) -> Self {
        self.loyalty_orders = orders;
        self
    }

    pub fn cancelling_at(mut self, point: CancelPoint) -> Self {
        self.cancel_at = Some(point);
        self
    }

    /// How long the customer has been waiting at `now`
    pub fn waited(&self, now: NaiveDateTime) -> Duration {
        now - self.arrived_at
    }

    pub fn has_run_out_of_patience(&self, now: NaiveDateTime) -> bool {
        self.waited(now) > self.patience
    }

    pub fn pricing_context(&self, at: NaiveTime) -> PricingContext {
        PricingContext {
            membership: self.membership,
            loyalty_orders: self.loyalty_orders,
            at,
            promo_code: self.request.promo_code.clone(),
        }
    }
}

/// Staff stamina budget for a shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StaminaPolicy {
    #[validate(range(min = 1))]
    pub initial: u32,
    pub cost_per_order: u32,
    /// Regained at the start of every hour, up to `initial`
    pub recovery_per_hour: u32,
    /// The shift closes early once stamina drops below this
    pub floor: u32,
}

/// Scheduled restock during the shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockPlan {
    /// Restock at the start of every n-th operating hour
    pub every_hours: u32,
    pub amounts: ResourceMap,
}

/// Dispatch loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_dispatch_policy"))]
pub struct DispatchPolicy {
    #[validate(range(min = 1))]
    pub hourly_customer_cap: u32,
    /// How many arrived customers are scanned for a VIP during rush hours
    pub vip_lookahead: usize,
    #[serde(default)]
    pub rush_hours: Vec<u32>,
    /// Added to revenue for each VIP served
    #[serde(default)]
    pub vip_bonus: Cents,
    #[validate]
    pub stamina: StaminaPolicy,
    /// Close early once every listed resource is below its level
    #[serde(default)]
    pub critical_levels: ResourceMap,
    #[serde(default)]
    pub restock: Option<RestockPlan>,
}

fn validate_dispatch_policy(policy: &DispatchPolicy) -> Result<(), ValidationError> {
    if policy.rush_hours.iter().any(|hour| *hour > 23) {
        return Err(ValidationError::new("rush_hour_out_of_range"));
    }
    if policy.vip_bonus < Cents::ZERO {
        return Err(ValidationError::new("vip_bonus_negative"));
    }
    if policy.stamina.floor > policy.stamina.initial {
        return Err(ValidationError::new("stamina_floor_above_initial"));
    }
    match &policy.restock {
        Some(plan) if plan.every_hours == 0 => Err(ValidationError::new("restock_interval_zero")),
        _ => Ok(()),
    }
}
