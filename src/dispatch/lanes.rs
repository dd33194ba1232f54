// Register Lanes
//
// Concurrent variant of the dispatcher: several lanes pull customers from one
// shared queue and reserve from one SharedLedger. Outcomes flow over a channel
// to a single collector, so statistics are only ever written by one task.
//
// Lanes serve a burst against the clock as it stands; they do not advance it.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::business_rules::{AdmissionController, PricingEngine, PromotionBook, RejectionKind};
use crate::catalog::MenuCatalog;
use crate::clock::Clock;
use crate::config::ShopConfig;
use crate::dispatch::{CancelPoint, Customer, CustomerQueue, LostCustomer, Receipt, ShiftReport};
use crate::error::{EngineError, EngineResult};
use crate::inventory::{ResourceLedger, SharedLedger};
use crate::money::Cents;
use crate::orders::{Order, OrderState, OrderStateMachine};

const OUTCOME_BUFFER: usize = 64;

/// What happened to one customer
#[derive(Debug)]
enum LaneOutcome {
    Delivered(Receipt),
    Cancelled(Order),
    Lost(LostCustomer),
}

/// Everything a lane needs, shared read-mostly between lanes
struct LaneShared {
    admission: AdmissionController,
    pricing: PricingEngine,
    ledger: SharedLedger,
    promotions: Mutex<PromotionBook>,
    clock: Arc<dyn Clock>,
    vip_bonus: Cents,
}

/// Pool of concurrent register lanes
pub struct LanePool {
    lanes: usize,
    shared: Arc<LaneShared>,
}

impl LanePool {
    pub fn new(config: &ShopConfig, catalog: Arc<dyn MenuCatalog>, clock: Arc<dyn Clock>, lanes: usize) -> Self {
        let shared = LaneShared {
            admission: AdmissionController::new(config.admission.clone(), catalog, clock.clone()),
            pricing: PricingEngine::new(config.pricing.clone()),
            ledger: SharedLedger::new(ResourceLedger::new(config.opening_stock.clone())),
            promotions: Mutex::new(PromotionBook::new(config.pricing.promotions.clone())),
            clock,
            vip_bonus: config.dispatch.vip_bonus,
        };
        Self {
            lanes: lanes.max(1),
            shared: Arc::new(shared),
        }
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.shared.ledger
    }

    /// Serve every queued customer and collect the outcomes
    #[instrument(skip(self, queue), fields(lanes = self.lanes, customers = queue.len()))]
    pub async fn serve(&self, queue: CustomerQueue) -> EngineResult<ShiftReport> {
        let queue = Arc::new(Mutex::new(queue));
        let (tx, mut rx) = mpsc::channel(OUTCOME_BUFFER);

        let handles: Vec<JoinHandle<EngineResult<()>>> = (0..self.lanes)
            .map(|lane| tokio::spawn(run_lane(lane, self.shared.clone(), queue.clone(), tx.clone())))
            .collect();
        drop(tx);

        let mut report = ShiftReport::default();
        while let Some(outcome) = rx.recv().await {
            match outcome {
                LaneOutcome::Delivered(receipt) => {
                    report.stats.record_served(&receipt);
                    report.receipts.push(receipt);
                }
                LaneOutcome::Cancelled(order) => {
                    report.stats.record_cancelled();
                    report.cancelled_orders.push(order);
                }
                LaneOutcome::Lost(lost) => {
                    report.stats.record_lost(&lost);
                    report.lost_customers.push(lost);
                }
            }
        }

        for handle in handles {
            handle.await.map_err(|e| EngineError::LaneFailed(e.to_string()))??;
        }

        report.stats.ending_resources = self.shared.ledger.levels().await;
        Ok(report)
    }
}

async fn run_lane(
    lane: usize,
    shared: Arc<LaneShared>,
    queue: Arc<Mutex<CustomerQueue>>,
    outcomes: mpsc::Sender<LaneOutcome>,
) -> EngineResult<()> {
    loop {
        let next = queue.lock().await.pop_front();
        let Some(customer) = next else {
            break;
        };

        debug!(lane, customer = %customer.name, "Lane picked up customer");
        let outcome = shared.serve(customer).await?;
        if outcomes.send(outcome).await.is_err() {
            // Collector is gone; nothing left to report to
            break;
        }
    }
    Ok(())
}

impl LaneShared {
    async fn serve(&self, customer: Customer) -> EngineResult<LaneOutcome> {
        let now = self.clock.now();
        if customer.has_run_out_of_patience(now) {
            return Ok(LaneOutcome::Lost(LostCustomer::new(
                &customer,
                RejectionKind::PatienceExceeded,
                format!("Waited {}s", customer.waited(now).num_seconds()),
            )));
        }

        let admitted = match self.admission.admit(&customer.request) {
            Ok(admitted) => admitted,
            Err(rejection) => {
                return match rejection.kind() {
                    Some(kind) => Ok(LaneOutcome::Lost(LostCustomer::new(&customer, kind, rejection.to_string()))),
                    None => Err(EngineError::MalformedRequest(rejection.to_string())),
                };
            }
        };

        if let Err(shortfall) = self.ledger.reserve(&admitted.requirements).await {
            return Ok(LaneOutcome::Lost(LostCustomer::new(
                &customer,
                RejectionKind::InsufficientResource,
                shortfall.to_string(),
            )));
        }

        // Held until the order settles so two lanes cannot share the last redemption
        let mut promotions = self.promotions.lock().await;
        let context = customer.pricing_context(now.time());
        let pricing = self.pricing.price(&admitted.line_items, &context, &promotions);
        let mut order = Order::new(customer.name.clone(), admitted.line_items, &pricing, admitted.requirements, now);

        transition(&mut order, OrderState::Paid, now)?;
        if customer.cancel_at != Some(CancelPoint::AfterPayment) {
            transition(&mut order, OrderState::Preparing, now)?;
        }
        if customer.cancel_at.is_some() {
            transition(&mut order, OrderState::Cancelled, now)?;
            self.ledger.release(order.reserved()).await;
            return Ok(LaneOutcome::Cancelled(order));
        }

        let done = now + admitted.prep_time;
        transition(&mut order, OrderState::Ready, done)?;
        transition(&mut order, OrderState::Delivered, done)?;
        if let Some(code) = pricing.promotion_code(&context) {
            promotions.record_use(code);
        }
        drop(promotions);

        let vip_bonus = if customer.is_vip { self.vip_bonus } else { Cents::ZERO };
        Ok(LaneOutcome::Delivered(Receipt::new(&order, pricing, customer.is_vip, vip_bonus)))
    }
}

fn transition(order: &mut Order, to: OrderState, at: chrono::NaiveDateTime) -> EngineResult<()> {
    OrderStateMachine::transition(order, to, at).map_err(|e| {
        error!(order_id = %order.id(), "{}", e);
        EngineError::from(e)
    })
}
