// Pricing Engine
//
// Calculates order prices from line items and a customer/promotion context.
// Discount percentages from every source are summed, capped, and applied once;
// tax is charged on the discounted amount.

use crate::business_rules::types::{DiscountSource, MembershipTier};
use crate::money::Cents;
use crate::orders::LineItem;
use crate::validation::{
    parse_time_of_day, validate_percentage, validate_promo_code, validate_rate, validate_time_of_day,
};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use validator::{Validate, ValidationError};

/// Time-of-day discount window (e.g. happy hour)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_time_window"))]
pub struct TimeWindow {
    pub start: String, // Format: "HH:MM"
    pub end: String,   // Format: "HH:MM"
    pub percent: Decimal,
    pub description: Option<String>,
}

impl TimeWindow {
    /// True when `time` falls inside the window; windows may wrap past midnight
    pub fn contains(&self, time: NaiveTime) -> bool {
        match (parse_time_of_day(&self.start), parse_time_of_day(&self.end)) {
            (Some(start), Some(end)) if start <= end => time >= start && time < end,
            // Overnight range (e.g., 22:00 - 02:00)
            (Some(start), Some(end)) => time >= start || time < end,
            _ => false,
        }
    }
}

fn validate_time_window(window: &TimeWindow) -> Result<(), ValidationError> {
    validate_time_of_day(&window.start)?;
    validate_time_of_day(&window.end)?;
    validate_percentage(window.percent)
}

/// Loyalty bonus earned after a number of past orders
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_loyalty_tier"))]
pub struct LoyaltyTier {
    pub min_orders: u32,
    pub percent: Decimal,
}

fn validate_loyalty_tier(tier: &LoyaltyTier) -> Result<(), ValidationError> {
    validate_percentage(tier.percent)
}

/// Promotion code definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_promotion"))]
pub struct Promotion {
    pub code: String,
    pub percent: Decimal,
    /// Minimum subtotal for the code to apply
    #[serde(default)]
    pub min_order: Cents,
    /// Maximum number of redemptions per shift; unlimited when absent
    pub usage_limit: Option<u32>,
}

fn validate_promotion(promotion: &Promotion) -> Result<(), ValidationError> {
    validate_promo_code(&promotion.code)?;
    validate_percentage(promotion.percent)
}

/// Promotions and their redemption counters for one shift
///
/// Pricing only reads the book; the dispatcher records a redemption once an
/// order has actually been fulfilled.
#[derive(Debug, Clone, Default)]
pub struct PromotionBook {
    promotions: HashMap<String, Promotion>,
    uses: HashMap<String, u32>,
}

impl PromotionBook {
    pub fn new(promotions: impl IntoIterator<Item = Promotion>) -> Self {
        Self {
            promotions: promotions
                .into_iter()
                .map(|promotion| (promotion.code.clone(), promotion))
                .collect(),
            uses: HashMap::new(),
        }
    }

    /// The promotion for `code` if it is known, the subtotal meets its
    /// minimum, and it still has redemptions left
    pub fn redeemable(&self, code: &str, subtotal: Cents) -> Option<&Promotion> {
        let promotion = self.promotions.get(code)?;
        if subtotal < promotion.min_order {
            return None;
        }
        match promotion.usage_limit {
            Some(limit) if self.uses(code) >= limit => None,
            _ => Some(promotion),
        }
    }

    /// Count one redemption. Returns false for unknown codes or an exhausted limit.
    pub fn record_use(&mut self, code: &str) -> bool {
        let Some(promotion) = self.promotions.get(code) else {
            return false;
        };
        let used = self.uses.entry(code.to_string()).or_insert(0);
        if promotion.usage_limit.is_some_and(|limit| *used >= limit) {
            return false;
        }
        *used += 1;
        true
    }

    pub fn uses(&self, code: &str) -> u32 {
        self.uses.get(code).copied().unwrap_or(0)
    }
}

/// Pricing configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_pricing_policy"))]
pub struct PricingPolicy {
    /// Tax rate applied after discount (e.g. 0.085)
    pub tax_rate: Decimal,
    /// Maximum combined discount percentage
    pub discount_cap: Decimal,
    #[serde(default)]
    pub membership: BTreeMap<MembershipTier, Decimal>,
    #[serde(default)]
    #[validate]
    pub loyalty_tiers: Vec<LoyaltyTier>,
    #[serde(default)]
    #[validate]
    pub time_windows: Vec<TimeWindow>,
    #[serde(default)]
    #[validate]
    pub promotions: Vec<Promotion>,
}

fn validate_pricing_policy(policy: &PricingPolicy) -> Result<(), ValidationError> {
    validate_rate(policy.tax_rate)?;
    validate_percentage(policy.discount_cap)?;
    policy
        .membership
        .values()
        .try_for_each(|percent| validate_percentage(*percent))
}

/// Customer and time context for one pricing calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingContext {
    pub membership: MembershipTier,
    /// Orders the customer placed before this one
    pub loyalty_orders: u32,
    pub at: NaiveTime,
    pub promo_code: Option<String>,
}

/// Discount contribution from a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedDiscount {
    pub source: DiscountSource,
    pub percent: Decimal,
    pub description: String,
}

/// Result of pricing calculation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Cents,
    pub applied: Vec<AppliedDiscount>,
    /// Sum of all source percentages before the cap
    pub requested_percent: Decimal,
    /// Percentage actually applied
    pub applied_percent: Decimal,
    /// True when the cap clamped the requested percentage
    pub capped: bool,
    pub discount: Cents,
    pub tax: Cents,
    pub total: Cents,
}

impl PriceBreakdown {
    /// Promotion code that contributed to this price, if any
    pub fn promotion_code<'a>(&self, context: &'a PricingContext) -> Option<&'a str> {
        self.applied
            .iter()
            .any(|discount| discount.source == DiscountSource::Promotion)
            .then(|| context.promo_code.as_deref())
            .flatten()
    }
}

/// Pricing Engine
///
/// Stateless apart from its policy; safe to share between lanes.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    policy: PricingPolicy,
}

impl PricingEngine {
    /// Create a new PricingEngine
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Subtotal of the line items in cents
    pub fn subtotal(items: &[LineItem]) -> Cents {
        items.iter().map(LineItem::subtotal).sum()
    }

    /// Price the line items for the given context
    ///
    /// 1. Subtotal from items
    /// 2. Collect discount percentages from every applicable source
    /// 3. Sum and clamp at the cap
    /// 4. Tax the discounted amount
    pub fn price(&self, items: &[LineItem], context: &PricingContext, promotions: &PromotionBook) -> PriceBreakdown {
        let subtotal = Self::subtotal(items);
        let applied = self.collect_discounts(subtotal, context, promotions);

        let requested_percent: Decimal = applied.iter().map(|discount| discount.percent).sum();
        let capped = requested_percent > self.policy.discount_cap;
        let applied_percent = requested_percent.min(self.policy.discount_cap);

        let discount = subtotal.percent(applied_percent);
        let taxable = subtotal - discount;
        let tax = taxable.scale(self.policy.tax_rate);

        PriceBreakdown {
            subtotal,
            applied,
            requested_percent,
            applied_percent,
            capped,
            discount,
            tax,
            total: taxable + tax,
        }
    }

    fn collect_discounts(
        &self,
        subtotal: Cents,
        context: &PricingContext,
        promotions: &PromotionBook,
    ) -> Vec<AppliedDiscount> {
        let mut applied = Vec::new();

        if let Some(percent) = self.policy.membership.get(&context.membership) {
            if !percent.is_zero() {
                applied.push(AppliedDiscount {
                    source: DiscountSource::Membership,
                    percent: *percent,
                    description: format!("{} member", context.membership),
                });
            }
        }

        // Highest tier the customer has reached
        let loyalty = self
            .policy
            .loyalty_tiers
            .iter()
            .filter(|tier| context.loyalty_orders >= tier.min_orders)
            .max_by_key(|tier| tier.min_orders);
        if let Some(tier) = loyalty {
            applied.push(AppliedDiscount {
                source: DiscountSource::Loyalty,
                percent: tier.percent,
                description: format!("Loyalty after {} orders", tier.min_orders),
            });
        }

        for window in self.policy.time_windows.iter().filter(|window| window.contains(context.at)) {
            applied.push(AppliedDiscount {
                source: DiscountSource::TimeOfDay,
                percent: window.percent,
                description: window
                    .description
                    .clone()
                    .unwrap_or_else(|| "Time-based discount".to_string()),
            });
        }

        if let Some(promotion) = context
            .promo_code
            .as_deref()
            .and_then(|code| promotions.redeemable(code, subtotal))
        {
            applied.push(AppliedDiscount {
                source: DiscountSource::Promotion,
                percent: promotion.percent,
                description: format!("Promotion {}", promotion.code),
            });
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn line(price: i64, quantity: u32) -> LineItem {
        LineItem {
            item_id: "drink".to_string(),
            name: "Drink".to_string(),
            unit_price: Cents::new(price),
            quantity,
        }
    }

    fn policy() -> PricingPolicy {
        PricingPolicy {
            tax_rate: dec!(0.085),
            discount_cap: dec!(25),
            membership: BTreeMap::from([(MembershipTier::Gold, dec!(10))]),
            loyalty_tiers: vec![
                LoyaltyTier { min_orders: 5, percent: dec!(2) },
                LoyaltyTier { min_orders: 20, percent: dec!(5) },
            ],
            time_windows: vec![TimeWindow {
                start: "15:00".to_string(),
                end: "17:00".to_string(),
                percent: dec!(20),
                description: Some("Happy hour".to_string()),
            }],
            promotions: vec![],
        }
    }

    fn context(membership: MembershipTier, at: NaiveTime) -> PricingContext {
        PricingContext {
            membership,
            loyalty_orders: 0,
            at,
            promo_code: None,
        }
    }

    #[test]
    fn test_capped_discount_then_tax() {
        let engine = PricingEngine::new(policy());
        let breakdown = engine.price(
            &[line(1000, 1)],
            &context(MembershipTier::Gold, at(15, 30)),
            &PromotionBook::default(),
        );

        assert_eq!(breakdown.subtotal, Cents::new(1000));
        assert_eq!(breakdown.requested_percent, dec!(30));
        assert_eq!(breakdown.applied_percent, dec!(25));
        assert!(breakdown.capped);
        assert_eq!(breakdown.discount, Cents::new(250));
        assert_eq!(breakdown.tax, Cents::new(64));
        assert_eq!(breakdown.total, Cents::new(814));
    }

    #[test]
    fn test_no_discount_outside_window() {
        let engine = PricingEngine::new(policy());
        let breakdown = engine.price(
            &[line(450, 2)],
            &context(MembershipTier::None, at(9, 0)),
            &PromotionBook::default(),
        );

        assert!(breakdown.applied.is_empty());
        assert!(!breakdown.capped);
        assert_eq!(breakdown.discount, Cents::ZERO);
        // 900 * 0.085 = 76.5
        assert_eq!(breakdown.tax, Cents::new(77));
        assert_eq!(breakdown.total, Cents::new(977));
    }

    #[test]
    fn test_highest_loyalty_tier_wins() {
        let engine = PricingEngine::new(policy());
        let mut ctx = context(MembershipTier::None, at(9, 0));
        ctx.loyalty_orders = 25;

        let breakdown = engine.price(&[line(1000, 1)], &ctx, &PromotionBook::default());
        assert_eq!(breakdown.applied.len(), 1);
        assert_eq!(breakdown.applied[0].source, DiscountSource::Loyalty);
        assert_eq!(breakdown.applied_percent, dec!(5));
    }

    #[test]
    fn test_promotion_respects_minimum_and_limit() {
        let engine = PricingEngine::new(policy());
        let mut book = PromotionBook::new(vec![Promotion {
            code: "WELCOME".to_string(),
            percent: dec!(10),
            min_order: Cents::new(500),
            usage_limit: Some(1),
        }]);
        let mut ctx = context(MembershipTier::None, at(9, 0));
        ctx.promo_code = Some("WELCOME".to_string());

        let small = engine.price(&[line(300, 1)], &ctx, &book);
        assert!(small.applied.is_empty());
        assert_eq!(small.promotion_code(&ctx), None);

        let large = engine.price(&[line(600, 1)], &ctx, &book);
        assert_eq!(large.applied_percent, dec!(10));
        assert_eq!(large.promotion_code(&ctx), Some("WELCOME"));

        assert!(book.record_use("WELCOME"));
        assert!(!book.record_use("WELCOME"));
        let exhausted = engine.price(&[line(600, 1)], &ctx, &book);
        assert!(exhausted.applied.is_empty());
    }

    #[test]
    fn test_pricing_does_not_consume_promotions() {
        let engine = PricingEngine::new(policy());
        let book = PromotionBook::new(vec![Promotion {
            code: "ONCE".to_string(),
            percent: dec!(5),
            min_order: Cents::ZERO,
            usage_limit: Some(1),
        }]);
        let mut ctx = context(MembershipTier::None, at(9, 0));
        ctx.promo_code = Some("ONCE".to_string());

        let first = engine.price(&[line(1000, 1)], &ctx, &book);
        let second = engine.price(&[line(1000, 1)], &ctx, &book);
        assert_eq!(first, second);
        assert_eq!(book.uses("ONCE"), 0);
    }

    #[test]
    fn test_unknown_promotion_is_ignored() {
        let mut book = PromotionBook::default();
        assert!(book.redeemable("NOPE", Cents::new(10_000)).is_none());
        assert!(!book.record_use("NOPE"));
    }

    #[test]
    fn test_overnight_window() {
        let window = TimeWindow {
            start: "22:00".to_string(),
            end: "02:00".to_string(),
            percent: dec!(15),
            description: None,
        };
        assert!(window.contains(at(23, 0)));
        assert!(window.contains(at(1, 59)));
        assert!(!window.contains(at(2, 0)));
        assert!(!window.contains(at(12, 0)));
    }

    #[test]
    fn test_policy_validation() {
        assert!(policy().validate().is_ok());

        let mut bad = policy();
        bad.tax_rate = dec!(8.5);
        assert!(bad.validate().is_err());

        let mut bad = policy();
        bad.time_windows[0].start = "3pm".to_string();
        assert!(bad.validate().is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn tier_strategy() -> impl Strategy<Value = MembershipTier> {
        prop_oneof![
            Just(MembershipTier::None),
            Just(MembershipTier::Silver),
            Just(MembershipTier::Gold),
            Just(MembershipTier::Platinum),
        ]
    }

    fn engine(cap: u32) -> PricingEngine {
        PricingEngine::new(PricingPolicy {
            tax_rate: Decimal::new(85, 3),
            discount_cap: Decimal::from(cap),
            membership: BTreeMap::from([
                (MembershipTier::Silver, Decimal::from(5)),
                (MembershipTier::Gold, Decimal::from(10)),
                (MembershipTier::Platinum, Decimal::from(15)),
            ]),
            loyalty_tiers: vec![LoyaltyTier { min_orders: 3, percent: Decimal::from(10) }],
            time_windows: vec![TimeWindow {
                start: "07:00".to_string(),
                end: "09:00".to_string(),
                percent: Decimal::from(20),
                description: None,
            }],
            promotions: vec![],
        })
    }

    proptest! {
        /// Pricing is a pure function of its inputs
        #[test]
        fn prop_price_is_deterministic(
            prices in prop::collection::vec((1i64..=2_000, 1u32..=5), 1..=6),
            tier in tier_strategy(),
            loyalty_orders in 0u32..=10,
            hour in 6u32..=20,
            cap in 0u32..=100,
        ) {
            let items: Vec<LineItem> = prices
                .iter()
                .map(|(price, quantity)| LineItem {
                    item_id: "x".to_string(),
                    name: "X".to_string(),
                    unit_price: Cents::new(*price),
                    quantity: *quantity,
                })
                .collect();
            let ctx = PricingContext {
                membership: tier,
                loyalty_orders,
                at: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                promo_code: None,
            };
            let engine = engine(cap);
            let book = PromotionBook::default();

            prop_assert_eq!(engine.price(&items, &ctx, &book), engine.price(&items, &ctx, &book));
        }

        /// Applied discount never exceeds the cap and totals stay consistent
        #[test]
        fn prop_cap_and_total_invariants(
            subtotal in 0i64..=100_000,
            tier in tier_strategy(),
            loyalty_orders in 0u32..=10,
            hour in 6u32..=20,
            cap in 0u32..=100,
        ) {
            let items = vec![LineItem {
                item_id: "x".to_string(),
                name: "X".to_string(),
                unit_price: Cents::new(subtotal),
                quantity: 1,
            }];
            let ctx = PricingContext {
                membership: tier,
                loyalty_orders,
                at: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                promo_code: None,
            };
            let breakdown = engine(cap).price(&items, &ctx, &PromotionBook::default());

            prop_assert!(breakdown.applied_percent <= Decimal::from(cap));
            prop_assert_eq!(breakdown.capped, breakdown.requested_percent > Decimal::from(cap));
            prop_assert!(breakdown.discount <= breakdown.subtotal);
            prop_assert!(breakdown.tax >= Cents::ZERO);
            prop_assert_eq!(breakdown.total, breakdown.subtotal - breakdown.discount + breakdown.tax);
        }
    }
}
