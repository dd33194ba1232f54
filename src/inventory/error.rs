use crate::inventory::ResourceMap;

/// Reservation rejected because at least one resource is short
///
/// `shortfall` names every short resource and how much is missing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Insufficient resources: {shortfall}")]
pub struct InsufficientResources {
    pub shortfall: ResourceMap,
}
