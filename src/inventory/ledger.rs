// Resource Ledger
//
// Tracks finite, depleting stock for one shift.
// Reservations are all-or-nothing so a drink is never half made.

use crate::inventory::{InsufficientResources, Resource, ResourceMap};

/// Resource Ledger
///
/// Owns the shift's resource pool. Quantities never go negative: a reservation
/// that would overdraw any resource deducts nothing.
#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    stock: ResourceMap,
}

impl ResourceLedger {
    /// Create a ledger with the given opening stock
    pub fn new(opening_stock: ResourceMap) -> Self {
        Self {
            stock: opening_stock,
        }
    }

    /// Reserve every requirement, or nothing
    ///
    /// # Returns
    /// `Ok(())` after deducting all requirements, or `Err` naming every short
    /// resource and the missing amount. On `Err` the pool is unchanged.
    pub fn reserve(&mut self, requirements: &ResourceMap) -> Result<(), InsufficientResources> {
        let shortfall: ResourceMap = requirements
            .iter()
            .filter_map(|(resource, needed)| {
                let available = self.stock.get(resource);
                (needed > available).then(|| (resource, needed - available))
            })
            .collect();

        if !shortfall.is_empty() {
            tracing::debug!("Reservation rejected, short by {}", shortfall);
            return Err(InsufficientResources { shortfall });
        }

        for (resource, needed) in requirements.iter() {
            let available = self.stock.get(resource);
            self.stock.set(resource, available - needed);
        }

        Ok(())
    }

    /// Return previously reserved resources to the pool
    ///
    /// Compensation for an order cancelled after its reservation.
    pub fn release(&mut self, amounts: &ResourceMap) {
        self.stock.add(amounts);
    }

    /// Add stock. Always succeeds and has no upper bound.
    pub fn replenish(&mut self, amounts: &ResourceMap) {
        self.stock.add(amounts);
    }

    pub fn level(&self, resource: Resource) -> u64 {
        self.stock.get(resource)
    }

    /// Snapshot of the current pool
    pub fn levels(&self) -> &ResourceMap {
        &self.stock
    }

    /// True when every resource named in `thresholds` is below its threshold
    ///
    /// An empty threshold map is never critical.
    pub fn is_critical(&self, thresholds: &ResourceMap) -> bool {
        let mut named = thresholds.iter().peekable();
        named.peek().is_some()
            && named.all(|(resource, threshold)| self.stock.get(resource) < threshold)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum LedgerOp {
        Reserve(ResourceMap),
        Release(ResourceMap),
        Replenish(ResourceMap),
    }

    fn resource_strategy() -> impl Strategy<Value = Resource> {
        prop_oneof![
            Just(Resource::Beans),
            Just(Resource::Milk),
            Just(Resource::Water),
            Just(Resource::Cups),
        ]
    }

    fn map_strategy() -> impl Strategy<Value = ResourceMap> {
        prop::collection::vec((resource_strategy(), 0u64..=600), 0..=4)
            .prop_map(|entries| entries.into_iter().collect())
    }

    fn op_strategy() -> impl Strategy<Value = LedgerOp> {
        prop_oneof![
            4 => map_strategy().prop_map(LedgerOp::Reserve),
            1 => map_strategy().prop_map(LedgerOp::Release),
            1 => map_strategy().prop_map(LedgerOp::Replenish),
        ]
    }

    proptest! {
        /// A failed reservation leaves the pool identical to before the call
        #[test]
        fn prop_failed_reserve_changes_nothing(
            opening in map_strategy(),
            request in map_strategy(),
        ) {
            let mut ledger = ResourceLedger::new(opening);
            let before = ledger.levels().clone();
            if ledger.reserve(&request).is_err() {
                prop_assert_eq!(ledger.levels(), &before);
            }
        }

        /// A successful reservation deducts exactly the requirement
        #[test]
        fn prop_successful_reserve_deducts_exactly(
            opening in map_strategy(),
            request in map_strategy(),
        ) {
            let mut ledger = ResourceLedger::new(opening);
            let before = ledger.levels().clone();
            if ledger.reserve(&request).is_ok() {
                for resource in Resource::ALL {
                    prop_assert_eq!(
                        ledger.level(resource),
                        before.get(resource) - request.get(resource)
                    );
                }
            }
        }

        /// Any op sequence keeps stock consistent with a shadow model that never dips below zero
        #[test]
        fn prop_stock_never_negative(
            opening in map_strategy(),
            ops in prop::collection::vec(op_strategy(), 0..=40),
        ) {
            let mut ledger = ResourceLedger::new(opening.clone());
            let mut shadow: Vec<i128> = Resource::ALL.iter().map(|r| i128::from(opening.get(*r))).collect();

            for op in ops {
                match op {
                    LedgerOp::Reserve(request) => {
                        let fits = Resource::ALL
                            .iter()
                            .enumerate()
                            .all(|(i, r)| shadow[i] >= i128::from(request.get(*r)));
                        prop_assert_eq!(ledger.reserve(&request).is_ok(), fits);
                        if fits {
                            for (i, r) in Resource::ALL.iter().enumerate() {
                                shadow[i] -= i128::from(request.get(*r));
                            }
                        }
                    }
                    LedgerOp::Release(amounts) | LedgerOp::Replenish(amounts) => {
                        ledger.replenish(&amounts);
                        for (i, r) in Resource::ALL.iter().enumerate() {
                            shadow[i] += i128::from(amounts.get(*r));
                        }
                    }
                }

                for (i, r) in Resource::ALL.iter().enumerate() {
                    prop_assert!(shadow[i] >= 0);
                    prop_assert_eq!(i128::from(ledger.level(*r)), shadow[i]);
                }
            }
        }
    }
}
