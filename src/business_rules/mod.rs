// Business Rules Module
//
// The decision-making parts of the engine:
// - Admission: guard clauses an order request must pass before any stock is touched
// - Pricing: subtotal, stacked and capped discounts, post-discount tax
//
// Both are pure with respect to shift state; the dispatcher owns every mutation.

pub mod admission;
pub mod error;
pub mod pricing;
pub mod types;

// Re-export commonly used types for convenience
pub use admission::{
    AdmissionController,
    AdmissionPolicy,
    Admitted,
    ApproveAll,
    DeliveryPolicy,
    PaymentAuthorizer,
    ShopHours,
};
pub use error::{AdmissionError, RejectionKind};
pub use pricing::{
    AppliedDiscount,
    LoyaltyTier,
    PriceBreakdown,
    PricingContext,
    PricingEngine,
    PricingPolicy,
    Promotion,
    PromotionBook,
    TimeWindow,
};
pub use types::{AvailabilityStatus, DiscountSource, MembershipTier, MenuCategory};
