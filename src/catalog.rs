// Menu Catalog
//
// Read-only lookup of menu items: price, availability, per-unit recipe and brew time.
// The engine consumes the catalog through the MenuCatalog trait; InMemoryCatalog
// is built from configuration.

use crate::business_rules::types::{AvailabilityStatus, MenuCategory};
use crate::inventory::ResourceMap;
use crate::money::Cents;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// A sellable menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MenuItem {
    #[validate(length(min = 1, message = "Item id must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "Item name must not be empty"))]
    pub name: String,
    pub category: MenuCategory,
    /// Unit price in cents
    pub price: Cents,
    #[serde(default = "default_status")]
    pub status: AvailabilityStatus,
    /// Resources consumed per unit
    #[serde(default)]
    pub recipe: ResourceMap,
    /// Brew time per unit, seconds
    #[serde(default)]
    pub prep_seconds: u32,
}

fn default_status() -> AvailabilityStatus {
    AvailabilityStatus::Available
}

impl MenuItem {
    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }
}

/// Read-only menu lookup
pub trait MenuCatalog: Send + Sync {
    fn lookup(&self, item_id: &str) -> Option<&MenuItem>;
}

/// Catalog held in memory, keyed by item id
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: HashMap<String, MenuItem>,
}

impl InMemoryCatalog {
    pub fn new(items: impl IntoIterator<Item = MenuItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id.clone(), item)).collect(),
        }
    }

    /// Change an item's availability. Returns false for unknown items.
    pub fn set_status(&mut self, item_id: &str, status: AvailabilityStatus) -> bool {
        match self.items.get_mut(item_id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl MenuCatalog for InMemoryCatalog {
    fn lookup(&self, item_id: &str) -> Option<&MenuItem> {
        self.items.get(item_id)
    }
}
