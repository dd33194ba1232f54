// Arrival Generator
//
// Seeded stream of demo customers for the shift binary. The mix deliberately
// includes requests that admission will reject (gift cards, far deliveries,
// seasonal items, oversized quantities) so a report exercises every bucket.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::business_rules::{MembershipTier, ShopHours};
use crate::config::ShopConfig;
use crate::dispatch::{CancelPoint, Customer};
use crate::orders::{DeliveryRequest, OrderRequest, PaymentMethod, RequestedItem};

const PAYMENTS: [PaymentMethod; 4] = [
    PaymentMethod::Cash,
    PaymentMethod::Card,
    PaymentMethod::MobileWallet,
    PaymentMethod::GiftCard,
];

const TIERS: [MembershipTier; 4] = [
    MembershipTier::None,
    MembershipTier::Silver,
    MembershipTier::Gold,
    MembershipTier::Platinum,
];

/// Shape of the generated customer stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ArrivalProfile {
    #[validate(range(min = 1, max = 240))]
    pub customers_per_hour: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub vip_share: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub delivery_share: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub promo_share: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub cancel_share: f64,
    #[validate(range(min = 1))]
    pub max_patience_minutes: i64,
}

impl Default for ArrivalProfile {
    fn default() -> Self {
        Self {
            customers_per_hour: 14,
            vip_share: 0.1,
            delivery_share: 0.15,
            promo_share: 0.2,
            cancel_share: 0.05,
            max_patience_minutes: 25,
        }
    }
}

/// Deterministic customer generator
pub struct ArrivalGenerator {
    rng: StdRng,
    menu_ids: Vec<String>,
    promo_codes: Vec<String>,
    served_names: u32,
}

impl ArrivalGenerator {
    pub fn new(seed: u64, config: &ShopConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            menu_ids: config.menu.iter().map(|item| item.id.clone()).collect(),
            promo_codes: config.pricing.promotions.iter().map(|promo| promo.code.clone()).collect(),
            served_names: 0,
        }
    }

    /// Customers for every opening hour of `date`, in arrival order
    pub fn generate(&mut self, date: NaiveDate, hours: ShopHours, profile: &ArrivalProfile) -> Vec<Customer> {
        let mut customers = Vec::new();
        for hour in hours.open_hour..hours.close_hour {
            let Some(hour_start) = date.and_hms_opt(hour, 0, 0) else {
                continue;
            };
            for _ in 0..profile.customers_per_hour {
                let arrived_at = hour_start + Duration::seconds(self.rng.gen_range(0..3600));
                customers.push(self.customer(arrived_at, profile));
            }
        }
        customers.sort_by_key(|customer| customer.arrived_at);
        customers
    }

    fn customer(&mut self, arrived_at: NaiveDateTime, profile: &ArrivalProfile) -> Customer {
        self.served_names += 1;
        let name = format!("guest-{:04}", self.served_names);

        let mut customer = Customer::new(name, arrived_at, self.request(profile))
            .with_patience(Duration::minutes(self.rng.gen_range(1..=profile.max_patience_minutes)))
            .with_membership(*TIERS.choose(&mut self.rng).unwrap_or(&MembershipTier::None))
            .with_loyalty_orders(self.rng.gen_range(0..30));

        if self.rng.gen_bool(profile.vip_share) {
            customer = customer.vip();
        }
        if self.rng.gen_bool(profile.cancel_share) {
            let point = if self.rng.gen_bool(0.5) {
                CancelPoint::AfterPayment
            } else {
                CancelPoint::WhilePreparing
            };
            customer = customer.cancelling_at(point);
        }
        customer
    }

    fn request(&mut self, profile: &ArrivalProfile) -> OrderRequest {
        let lines = self.rng.gen_range(1..=3);
        let mut items = Vec::with_capacity(lines);
        for _ in 0..lines {
            let Some(item_id) = self.menu_ids.choose(&mut self.rng).cloned() else {
                break;
            };
            // Now and then someone tries to order a whole tray
            let quantity = if self.rng.gen_bool(0.03) { 9 } else { self.rng.gen_range(1..=2) };
            items.push(RequestedItem { item_id, quantity });
        }

        let delivery = self
            .rng
            .gen_bool(profile.delivery_share)
            .then(|| DeliveryRequest {
                distance_m: self.rng.gen_range(200..=5000),
            });

        let promo_code = if self.rng.gen_bool(profile.promo_share) {
            self.promo_codes.choose(&mut self.rng).cloned()
        } else {
            None
        };

        OrderRequest {
            items,
            payment: *PAYMENTS.choose(&mut self.rng).unwrap_or(&PaymentMethod::Card),
            delivery,
            promo_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn generate(seed: u64) -> Vec<Customer> {
        let config = ShopConfig::default();
        ArrivalGenerator::new(seed, &config).generate(date(), config.admission.hours, &ArrivalProfile::default())
    }

    #[test]
    fn test_same_seed_same_customers() {
        assert_eq!(generate(7), generate(7));
        assert_ne!(generate(7), generate(8));
    }

    #[test]
    fn test_customers_arrive_in_order_within_opening_hours() {
        let customers = generate(42);
        assert_eq!(customers.len(), 12 * 14);
        assert!(customers.windows(2).all(|pair| pair[0].arrived_at <= pair[1].arrived_at));
        assert!(customers
            .iter()
            .all(|customer| (7..19).contains(&customer.arrived_at.hour())));
    }

    #[test]
    fn test_generated_requests_are_well_formed() {
        assert!(generate(3).iter().all(|customer| customer.request.validate().is_ok()));
    }

    #[test]
    fn test_profile_validation() {
        assert!(ArrivalProfile::default().validate().is_ok());
        let profile = ArrivalProfile {
            vip_share: 1.5,
            ..ArrivalProfile::default()
        };
        assert!(profile.validate().is_err());
    }
}
