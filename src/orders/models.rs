use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::business_rules::PriceBreakdown;
use crate::inventory::ResourceMap;
use crate::money::Cents;

/// Order state enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    New,
    Paid,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderState {
    pub const ALL: [OrderState; 6] = [
        OrderState::New,
        OrderState::Paid,
        OrderState::Preparing,
        OrderState::Ready,
        OrderState::Delivered,
        OrderState::Cancelled,
    ];

    /// Convert state to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "new",
            OrderState::Paid => "paid",
            OrderState::Preparing => "preparing",
            OrderState::Ready => "ready",
            OrderState::Delivered => "delivered",
            OrderState::Cancelled => "cancelled",
        }
    }

    /// Delivered and cancelled orders never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Cancelled)
    }
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::New
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileWallet,
    GiftCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileWallet => "mobile_wallet",
            PaymentMethod::GiftCard => "gift_card",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One priced line of an order, captured from the catalog at admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Cents,
    pub quantity: u32,
}

impl LineItem {
    pub fn subtotal(&self) -> Cents {
        self.unit_price * self.quantity
    }
}

/// Audit entry stamped on every successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: OrderState,
    pub to: OrderState,
    pub at: NaiveDateTime,
}

/// An admitted customer order
///
/// State changes only through `OrderStateMachine`; every other field is fixed
/// at creation.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    id: Uuid,
    customer: String,
    line_items: Vec<LineItem>,
    pub(super) state: OrderState,
    subtotal: Cents,
    discount: Cents,
    tax: Cents,
    total: Cents,
    reserved: ResourceMap,
    created_at: NaiveDateTime,
    pub(super) timeline: Vec<TransitionRecord>,
}

impl Order {
    /// Create a NEW order with its price and the resources reserved for it
    pub fn new(
        customer: impl Into<String>,
        line_items: Vec<LineItem>,
        pricing: &PriceBreakdown,
        reserved: ResourceMap,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: customer.into(),
            line_items,
            state: OrderState::New,
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            tax: pricing.tax,
            total: pricing.total,
            reserved,
            created_at,
            timeline: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the customer who placed the order
    pub fn customer(&self) -> &str {
        &self.customer
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn subtotal(&self) -> Cents {
        self.subtotal
    }

    pub fn discount(&self) -> Cents {
        self.discount
    }

    pub fn tax(&self) -> Cents {
        self.tax
    }

    pub fn total(&self) -> Cents {
        self.total
    }

    /// Resources held for this order; released again if it is cancelled
    pub fn reserved(&self) -> &ResourceMap {
        &self.reserved
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn timeline(&self) -> &[TransitionRecord] {
        &self.timeline
    }
}
