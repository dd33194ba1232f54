// Shift Statistics
//
// Counters and per-order records produced by one shift. Built up by the
// dispatcher and handed out read-only in the final ShiftReport.

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::business_rules::{DiscountSource, PriceBreakdown, RejectionKind};
use crate::dispatch::Customer;
use crate::inventory::ResourceMap;
use crate::money::Cents;
use crate::orders::{LineItem, Order, TransitionRecord};

/// Why a shift ended before closing time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Staff stamina fell below the floor
    StaffExhausted,
    /// Every watched resource fell below its critical level
    ResourcesCritical,
}

/// A delivered order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub order_id: Uuid,
    pub customer: String,
    pub is_vip: bool,
    pub line_items: Vec<LineItem>,
    pub pricing: PriceBreakdown,
    /// Extra revenue credited for serving a VIP
    pub vip_bonus: Cents,
    pub timeline: Vec<TransitionRecord>,
}

impl Receipt {
    pub fn new(order: &Order, pricing: PriceBreakdown, is_vip: bool, vip_bonus: Cents) -> Self {
        Self {
            order_id: order.id(),
            customer: order.customer().to_string(),
            is_vip,
            line_items: order.line_items().to_vec(),
            pricing,
            vip_bonus,
            timeline: order.timeline().to_vec(),
        }
    }

    pub fn redeemed_promotion(&self) -> bool {
        self.pricing
            .applied
            .iter()
            .any(|discount| discount.source == DiscountSource::Promotion)
    }
}

/// A customer who left without an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LostCustomer {
    pub name: String,
    pub is_vip: bool,
    pub reason: RejectionKind,
    pub detail: String,
}

impl LostCustomer {
    pub fn new(customer: &Customer, reason: RejectionKind, detail: impl Into<String>) -> Self {
        Self {
            name: customer.name.clone(),
            is_vip: customer.is_vip,
            reason,
            detail: detail.into(),
        }
    }
}

/// Aggregate counters for one shift
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShiftStats {
    pub served: u32,
    pub vip_served: u32,
    pub lost: u32,
    pub cancelled: u32,
    /// Order totals plus VIP bonuses
    pub revenue: Cents,
    pub vip_bonus_revenue: Cents,
    pub promotions_redeemed: u32,
    pub lost_by_reason: BTreeMap<RejectionKind, u32>,
    pub ending_resources: ResourceMap,
    pub hours_operated: u32,
    pub closed_early: Option<CloseReason>,
}

impl ShiftStats {
    pub fn record_served(&mut self, receipt: &Receipt) {
        self.served += 1;
        self.revenue += receipt.pricing.total + receipt.vip_bonus;
        if receipt.redeemed_promotion() {
            self.promotions_redeemed += 1;
        }
        if receipt.is_vip {
            self.vip_served += 1;
            self.vip_bonus_revenue += receipt.vip_bonus;
        }
    }

    pub fn record_lost(&mut self, lost: &LostCustomer) {
        self.lost += 1;
        *self.lost_by_reason.entry(lost.reason).or_insert(0) += 1;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled += 1;
    }

    pub fn lost_for(&self, reason: RejectionKind) -> u32 {
        self.lost_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

/// Everything a shift produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShiftReport {
    pub stats: ShiftStats,
    pub receipts: Vec<Receipt>,
    pub lost_customers: Vec<LostCustomer>,
    /// Archived cancelled orders
    pub cancelled_orders: Vec<Order>,
}
