use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Consumable stock tracked by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Coffee beans, grams
    Beans,
    /// Milk, millilitres
    Milk,
    /// Water, millilitres
    Water,
    /// Cups, units
    Cups,
}

impl Resource {
    pub const ALL: [Resource; 4] = [Resource::Beans, Resource::Milk, Resource::Water, Resource::Cups];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Beans => "beans",
            Resource::Milk => "milk",
            Resource::Water => "water",
            Resource::Cups => "cups",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Resource::Beans => "g",
            Resource::Milk | Resource::Water => "ml",
            Resource::Cups => "",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quantities per resource
///
/// Absent entries read as zero. Quantities are unsigned so a map can never
/// describe negative stock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceMap(BTreeMap<Resource, u64>);

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, resource: Resource) -> u64 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    pub fn set(&mut self, resource: Resource, quantity: u64) {
        self.0.insert(resource, quantity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u64)> + '_ {
        self.0.iter().map(|(resource, quantity)| (*resource, *quantity))
    }

    /// True when every entry is zero
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|quantity| *quantity == 0)
    }

    /// Add `other` into this map, saturating at `u64::MAX`
    pub fn add(&mut self, other: &ResourceMap) {
        for (resource, quantity) in other.iter() {
            let entry = self.0.entry(resource).or_insert(0);
            *entry = entry.saturating_add(quantity);
        }
    }

    /// Every quantity multiplied by `factor`
    pub fn times(&self, factor: u32) -> ResourceMap {
        ResourceMap(
            self.0
                .iter()
                .map(|(resource, quantity)| (*resource, quantity.saturating_mul(u64::from(factor))))
                .collect(),
        )
    }
}

impl<const N: usize> From<[(Resource, u64); N]> for ResourceMap {
    fn from(entries: [(Resource, u64); N]) -> Self {
        ResourceMap(BTreeMap::from(entries))
    }
}

impl FromIterator<(Resource, u64)> for ResourceMap {
    fn from_iter<I: IntoIterator<Item = (Resource, u64)>>(iter: I) -> Self {
        ResourceMap(iter.into_iter().collect())
    }
}

impl fmt::Display for ResourceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(resource, quantity)| format!("{}={}{}", resource, quantity, resource.unit()))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}
