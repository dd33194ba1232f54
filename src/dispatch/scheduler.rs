// Shift Scheduler
//
// Drives one business day hour by hour: restock and stamina recovery at the
// top of each hour, then customers in arrival order (VIPs first during rush
// hours) until the hourly cap, the end of the hour or an early close.
//
// Per customer: patience, admission, reservation, pricing, then the order
// walks NEW -> PAID -> PREPARING -> READY -> DELIVERED on the simulated clock.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::business_rules::{
    AdmissionController, PaymentAuthorizer, PricingEngine, PromotionBook, RejectionKind,
    ShopHours,
};
use crate::catalog::MenuCatalog;
use crate::clock::{Clock, SimulatedClock};
use crate::config::ShopConfig;
use crate::dispatch::{
    CancelPoint, CloseReason, Customer, CustomerQueue, DispatchPolicy, LostCustomer, Receipt, ReportSink,
    ShiftReport, ShiftStats,
};
use crate::error::{EngineError, EngineResult};
use crate::inventory::ResourceLedger;
use crate::money::Cents;
use crate::orders::{Order, OrderState, OrderStateMachine};

/// Mutable state owned by the dispatcher for the length of one shift
#[derive(Debug)]
pub struct ShiftState {
    pub ledger: ResourceLedger,
    pub promotions: PromotionBook,
    pub stamina: u32,
    pub stats: ShiftStats,
    /// Orders holding a reservation on this ledger
    in_flight: HashSet<Uuid>,
}

/// Single-threaded shift driver
pub struct ShiftScheduler {
    hours: ShopHours,
    policy: DispatchPolicy,
    admission: AdmissionController,
    pricing: PricingEngine,
    clock: Arc<SimulatedClock>,
    state: ShiftState,
}

impl ShiftScheduler {
    /// Create a scheduler that approves every payment
    pub fn new(config: &ShopConfig, catalog: Arc<dyn MenuCatalog>, clock: Arc<SimulatedClock>) -> Self {
        let admission = AdmissionController::new(config.admission.clone(), catalog, clock.clone());
        Self::from_parts(config, admission, clock)
    }

    /// Create a scheduler that asks `authorizer` about every payment
    pub fn with_authorizer(
        config: &ShopConfig,
        catalog: Arc<dyn MenuCatalog>,
        clock: Arc<SimulatedClock>,
        authorizer: Arc<dyn PaymentAuthorizer>,
    ) -> Self {
        let admission = AdmissionController::with_authorizer(config.admission.clone(), catalog, clock.clone(), authorizer);
        Self::from_parts(config, admission, clock)
    }

    fn from_parts(config: &ShopConfig, admission: AdmissionController, clock: Arc<SimulatedClock>) -> Self {
        Self {
            hours: config.admission.hours,
            policy: config.dispatch.clone(),
            admission,
            pricing: PricingEngine::new(config.pricing.clone()),
            clock,
            state: ShiftState {
                ledger: ResourceLedger::new(config.opening_stock.clone()),
                promotions: PromotionBook::new(config.pricing.promotions.clone()),
                stamina: config.dispatch.stamina.initial,
                stats: ShiftStats::default(),
                in_flight: HashSet::new(),
            },
        }
    }

    pub fn state(&self) -> &ShiftState {
        &self.state
    }

    /// Run the shift on the day the clock currently shows
    ///
    /// Business rejections end up in the report. Only a defect (an illegal
    /// state transition or a malformed request) stops the shift with an error.
    #[instrument(skip(self, queue, sink), fields(customers = queue.len()))]
    pub fn run_shift(&mut self, mut queue: CustomerQueue, sink: &mut dyn ReportSink) -> EngineResult<ShiftReport> {
        let mut report = ShiftReport::default();
        let date = self.clock.now().date();
        info!(
            "Opening shift on {} ({}:00-{}:00)",
            date, self.hours.open_hour, self.hours.close_hour
        );

        'hours: for (index, hour) in (self.hours.open_hour..self.hours.close_hour).enumerate() {
            let hour_start = date
                .and_hms_opt(hour, 0, 0)
                .ok_or_else(|| EngineError::Config(format!("invalid opening hour {}", hour)))?;
            let hour_end = hour_start + Duration::hours(1);

            self.clock.set(hour_start);
            if self.clock.now() >= hour_end {
                // A long order ran through the whole hour
                continue;
            }

            self.begin_hour(index as u32);
            let lookahead = self
                .policy
                .rush_hours
                .contains(&hour)
                .then_some(self.policy.vip_lookahead);

            let mut handled = 0;
            while handled < self.policy.hourly_customer_cap {
                if let Some(reason) = self.close_reason() {
                    warn!(?reason, stamina = self.state.stamina, "Closing shift early");
                    self.state.stats.closed_early = Some(reason);
                    break 'hours;
                }

                let now = self.clock.now();
                if now >= hour_end {
                    break;
                }

                let customer = match queue.pop_next(now, lookahead) {
                    Some(customer) => customer,
                    None => match queue.next_arrival() {
                        Some(arrival) if arrival < hour_end => {
                            self.clock.set(arrival);
                            continue;
                        }
                        _ => break,
                    },
                };

                handled += 1;
                self.serve(customer, &mut report, sink)?;
            }
        }

        for customer in queue.drain() {
            self.lose(&customer, RejectionKind::ShopClosed, "Still waiting at closing time", &mut report, sink);
        }

        self.state.stats.ending_resources = self.state.ledger.levels().clone();
        report.stats = self.state.stats.clone();
        sink.shift_closed(&report.stats);
        Ok(report)
    }

    /// Cancel an order in flight and return its resources to the ledger
    ///
    /// The order must hold a reservation on this scheduler's ledger.
    pub fn cancel_order(&mut self, order: &mut Order) -> EngineResult<()> {
        let cancellable = OrderStateMachine::is_valid_transition(order.state(), OrderState::Cancelled);
        if cancellable && !self.state.in_flight.contains(&order.id()) {
            warn!(order_id = %order.id(), "Refusing to cancel an order this shift did not reserve for");
            return Err(EngineError::UnknownOrder(order.id()));
        }

        self.transition(order, OrderState::Cancelled, self.clock.now())?;
        self.state.in_flight.remove(&order.id());
        self.state.ledger.release(order.reserved());
        self.state.stats.record_cancelled();
        debug!(order_id = %order.id(), "Released {}", order.reserved());
        Ok(())
    }

    fn begin_hour(&mut self, index: u32) {
        self.state.stats.hours_operated += 1;

        if let Some(plan) = &self.policy.restock {
            if index > 0 && index % plan.every_hours == 0 {
                self.state.ledger.replenish(&plan.amounts);
                info!("Restocked {}", plan.amounts);
            }
        }

        if index > 0 {
            let stamina = &self.policy.stamina;
            self.state.stamina = self
                .state
                .stamina
                .saturating_add(stamina.recovery_per_hour)
                .min(stamina.initial);
        }
    }

    fn close_reason(&self) -> Option<CloseReason> {
        if self.state.stamina < self.policy.stamina.floor {
            Some(CloseReason::StaffExhausted)
        } else if self.state.ledger.is_critical(&self.policy.critical_levels) {
            Some(CloseReason::ResourcesCritical)
        } else {
            None
        }
    }

    fn serve(&mut self, customer: Customer, report: &mut ShiftReport, sink: &mut dyn ReportSink) -> EngineResult<()> {
        let now = self.clock.now();

        // Abandonment costs no service time
        if customer.has_run_out_of_patience(now) {
            let detail = format!(
                "Waited {}s with {}s of patience",
                customer.waited(now).num_seconds(),
                customer.patience.num_seconds()
            );
            self.lose(&customer, RejectionKind::PatienceExceeded, detail, report, sink);
            return Ok(());
        }

        let admitted = match self.admission.admit(&customer.request) {
            Ok(admitted) => admitted,
            Err(rejection) => match rejection.kind() {
                Some(kind) => {
                    self.lose(&customer, kind, rejection.to_string(), report, sink);
                    return Ok(());
                }
                None => {
                    error!(customer = %customer.name, "{}", rejection);
                    return Err(EngineError::MalformedRequest(rejection.to_string()));
                }
            },
        };

        if let Err(shortfall) = self.state.ledger.reserve(&admitted.requirements) {
            self.lose(&customer, RejectionKind::InsufficientResource, shortfall.to_string(), report, sink);
            return Ok(());
        }

        let context = customer.pricing_context(now.time());
        let pricing = self.pricing.price(&admitted.line_items, &context, &self.state.promotions);
        let mut order = Order::new(
            customer.name.clone(),
            admitted.line_items,
            &pricing,
            admitted.requirements,
            now,
        );
        self.state.in_flight.insert(order.id());

        self.transition(&mut order, OrderState::Paid, now)?;
        if customer.cancel_at == Some(CancelPoint::AfterPayment) {
            return self.archive_cancelled(order, report, sink);
        }

        self.transition(&mut order, OrderState::Preparing, now)?;
        if customer.cancel_at == Some(CancelPoint::WhilePreparing) {
            return self.archive_cancelled(order, report, sink);
        }

        let done = now + admitted.prep_time;
        self.transition(&mut order, OrderState::Ready, done)?;
        self.transition(&mut order, OrderState::Delivered, done)?;
        self.state.in_flight.remove(&order.id());
        self.clock.set(done);

        if let Some(code) = pricing.promotion_code(&context) {
            self.state.promotions.record_use(code);
        }
        self.state.stamina = self.state.stamina.saturating_sub(self.policy.stamina.cost_per_order);

        let vip_bonus = if customer.is_vip { self.policy.vip_bonus } else { Cents::ZERO };
        let receipt = Receipt::new(&order, pricing, customer.is_vip, vip_bonus);
        self.state.stats.record_served(&receipt);
        sink.order_delivered(&receipt);
        report.receipts.push(receipt);
        Ok(())
    }

    fn archive_cancelled(&mut self, mut order: Order, report: &mut ShiftReport, sink: &mut dyn ReportSink) -> EngineResult<()> {
        self.cancel_order(&mut order)?;
        sink.order_cancelled(&order);
        report.cancelled_orders.push(order);
        Ok(())
    }

    fn transition(&self, order: &mut Order, to: OrderState, at: NaiveDateTime) -> EngineResult<()> {
        OrderStateMachine::transition(order, to, at).map_err(|e| {
            error!(order_id = %order.id(), "{}", e);
            EngineError::from(e)
        })
    }

    fn lose(
        &mut self,
        customer: &Customer,
        reason: RejectionKind,
        detail: impl Into<String>,
        report: &mut ShiftReport,
        sink: &mut dyn ReportSink,
    ) {
        let lost = LostCustomer::new(customer, reason, detail);
        self.state.stats.record_lost(&lost);
        sink.customer_lost(&lost);
        report.lost_customers.push(lost);
    }
}
