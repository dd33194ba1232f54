// Shared Ledger
//
// Clonable handle used when several register lanes reserve from one pool.
// The mutex makes every reservation a single serialized step.

use crate::inventory::{InsufficientResources, ResourceLedger, ResourceMap};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mutex-guarded ledger shared between lanes
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<ResourceLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: ResourceLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// All-or-nothing reservation, serialized against every other lane
    pub async fn reserve(&self, requirements: &ResourceMap) -> Result<(), InsufficientResources> {
        self.inner.lock().await.reserve(requirements)
    }

    pub async fn release(&self, amounts: &ResourceMap) {
        self.inner.lock().await.release(amounts);
    }

    pub async fn replenish(&self, amounts: &ResourceMap) {
        self.inner.lock().await.replenish(amounts);
    }

    pub async fn levels(&self) -> ResourceMap {
        self.inner.lock().await.levels().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Resource;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reservations_never_oversell() {
        let ledger = SharedLedger::new(ResourceLedger::new(ResourceMap::from([(Resource::Beans, 100)])));
        let shot = ResourceMap::from([(Resource::Beans, 18)]);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            let shot = shot.clone();
            handles.push(tokio::spawn(async move { ledger.reserve(&shot).await.is_ok() }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        // 100g covers five 18g shots
        assert_eq!(granted, 5);
        assert_eq!(ledger.levels().await.get(Resource::Beans), 10);
    }

    #[tokio::test]
    async fn test_release_and_replenish_through_handle() {
        let ledger = SharedLedger::new(ResourceLedger::default());
        let cups = ResourceMap::from([(Resource::Cups, 3)]);

        ledger.replenish(&cups).await;
        ledger.reserve(&cups).await.unwrap();
        ledger.release(&cups).await;

        assert_eq!(ledger.levels().await.get(Resource::Cups), 3);
    }
}
