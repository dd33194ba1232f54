// Customer Queue
//
// Arrival-ordered waiting line. During rush hours a VIP near the front of the
// line may be served ahead of earlier arrivals.

use chrono::NaiveDateTime;
use std::collections::VecDeque;
use validator::Validate;

use crate::dispatch::Customer;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Default)]
pub struct CustomerQueue {
    waiting: VecDeque<Customer>,
}

impl CustomerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue, rejecting any malformed request
    pub fn from_customers(customers: impl IntoIterator<Item = Customer>) -> EngineResult<Self> {
        let mut queue = Self::new();
        for customer in customers {
            queue.push(customer)?;
        }
        Ok(queue)
    }

    /// Enqueue in arrival order; customers with equal arrival keep insertion order
    pub fn push(&mut self, customer: Customer) -> EngineResult<()> {
        customer.request.validate().map_err(|e| {
            EngineError::MalformedRequest(format!("Malformed order request from {}: {}", customer.name, e))
        })?;

        let position = self
            .waiting
            .iter()
            .position(|queued| queued.arrived_at > customer.arrived_at)
            .unwrap_or(self.waiting.len());
        self.waiting.insert(position, customer);
        Ok(())
    }

    /// Next customer who has arrived by `now`
    ///
    /// With `vip_lookahead = Some(n)` the first VIP among the first `n` arrived
    /// customers is taken ahead of the line.
    pub fn pop_next(&mut self, now: NaiveDateTime, vip_lookahead: Option<usize>) -> Option<Customer> {
        let arrived = self
            .waiting
            .iter()
            .take_while(|customer| customer.arrived_at <= now)
            .count();
        if arrived == 0 {
            return None;
        }

        let window = vip_lookahead.unwrap_or(0).min(arrived);
        let vip = self.waiting.iter().take(window).position(|customer| customer.is_vip);
        self.waiting.remove(vip.unwrap_or(0))
    }

    /// Next customer regardless of arrival time
    pub fn pop_front(&mut self) -> Option<Customer> {
        self.waiting.pop_front()
    }

    /// Arrival time of the earliest queued customer
    pub fn next_arrival(&self) -> Option<NaiveDateTime> {
        self.waiting.front().map(|customer| customer.arrived_at)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Customer> + '_ {
        self.waiting.drain(..)
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }
}
