// Domain type definitions for the business rules
// Shared enums used by the catalog, admission and pricing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability status for menu items
///
/// Only `Available` items can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    /// Item can be ordered
    Available,

    /// Item is temporarily out of stock
    OutOfStock,

    /// Item is only sold during certain seasons
    Seasonal,

    /// Item has been permanently removed
    Discontinued,
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::OutOfStock => write!(f, "out_of_stock"),
            AvailabilityStatus::Seasonal => write!(f, "seasonal"),
            AvailabilityStatus::Discontinued => write!(f, "discontinued"),
        }
    }
}

/// Menu section an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Coffee,
    Tea,
    Pastry,
    Other,
}

impl fmt::Display for MenuCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuCategory::Coffee => write!(f, "coffee"),
            MenuCategory::Tea => write!(f, "tea"),
            MenuCategory::Pastry => write!(f, "pastry"),
            MenuCategory::Other => write!(f, "other"),
        }
    }
}

/// Customer membership tier
///
/// Each tier maps to a configured discount percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    None,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipTier::None => write!(f, "none"),
            MembershipTier::Silver => write!(f, "silver"),
            MembershipTier::Gold => write!(f, "gold"),
            MembershipTier::Platinum => write!(f, "platinum"),
        }
    }
}

/// Where a discount percentage came from
///
/// Sources are summed, never compounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    /// Membership tier discount
    Membership,

    /// Loyalty bonus for repeat customers
    Loyalty,

    /// Time-of-day window (e.g. happy hour)
    TimeOfDay,

    /// Promotion code
    Promotion,
}

impl fmt::Display for DiscountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountSource::Membership => write!(f, "membership"),
            DiscountSource::Loyalty => write!(f, "loyalty"),
            DiscountSource::TimeOfDay => write!(f, "time_of_day"),
            DiscountSource::Promotion => write!(f, "promotion"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_status_display() {
        assert_eq!(AvailabilityStatus::Available.to_string(), "available");
        assert_eq!(AvailabilityStatus::OutOfStock.to_string(), "out_of_stock");
        assert_eq!(AvailabilityStatus::Seasonal.to_string(), "seasonal");
        assert_eq!(AvailabilityStatus::Discontinued.to_string(), "discontinued");
    }

    #[test]
    fn test_membership_default_is_none() {
        assert_eq!(MembershipTier::default(), MembershipTier::None);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&MembershipTier::Platinum).unwrap();
        assert_eq!(json, "\"platinum\"");

        let json = serde_json::to_string(&DiscountSource::TimeOfDay).unwrap();
        assert_eq!(json, "\"time_of_day\"");

        let status: AvailabilityStatus = serde_json::from_str("\"seasonal\"").unwrap();
        assert_eq!(status, AvailabilityStatus::Seasonal);
    }
}
