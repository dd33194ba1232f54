// Report Sinks
//
// Receive shift events as they happen. Failures inside a sink must never
// block the shift, so every method is infallible.

use crate::dispatch::{LostCustomer, Receipt, ShiftStats};
use crate::orders::Order;

/// Observer for shift outcomes
pub trait ReportSink: Send {
    fn order_delivered(&mut self, receipt: &Receipt);

    fn order_cancelled(&mut self, order: &Order);

    fn customer_lost(&mut self, lost: &LostCustomer);

    fn shift_closed(&mut self, stats: &ShiftStats);
}

/// Writes every event to the tracing subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn order_delivered(&mut self, receipt: &Receipt) {
        tracing::info!(
            order_id = %receipt.order_id,
            customer = %receipt.customer,
            vip = receipt.is_vip,
            "Order delivered: total {} (discount {}, tax {})",
            receipt.pricing.total,
            receipt.pricing.discount,
            receipt.pricing.tax
        );
    }

    fn order_cancelled(&mut self, order: &Order) {
        tracing::info!(order_id = %order.id(), customer = %order.customer(), "Order cancelled");
    }

    fn customer_lost(&mut self, lost: &LostCustomer) {
        tracing::warn!(customer = %lost.name, reason = %lost.reason, "Customer lost: {}", lost.detail);
    }

    fn shift_closed(&mut self, stats: &ShiftStats) {
        tracing::info!(
            served = stats.served,
            lost = stats.lost,
            cancelled = stats.cancelled,
            revenue = %stats.revenue,
            "Shift closed after {} hours",
            stats.hours_operated
        );
    }
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub delivered: Vec<Receipt>,
    pub cancelled: Vec<Order>,
    pub lost: Vec<LostCustomer>,
    pub closed: Option<ShiftStats>,
}

impl ReportSink for MemorySink {
    fn order_delivered(&mut self, receipt: &Receipt) {
        self.delivered.push(receipt.clone());
    }

    fn order_cancelled(&mut self, order: &Order) {
        self.cancelled.push(order.clone());
    }

    fn customer_lost(&mut self, lost: &LostCustomer) {
        self.lost.push(lost.clone());
    }

    fn shift_closed(&mut self, stats: &ShiftStats) {
        self.closed = Some(stats.clone());
    }
}
