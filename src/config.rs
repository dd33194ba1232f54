// Shop Configuration
//
// Every tunable of a shift in one serde document: admission guards, pricing,
// dispatch, opening stock and the menu. Loaded from a JSON file named by
// SHOP_CONFIG (after reading .env) or taken from the built-in default shop.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use validator::{Validate, ValidationError};

use crate::business_rules::{
    AdmissionPolicy, AvailabilityStatus, DeliveryPolicy, LoyaltyTier, MembershipTier, MenuCategory, PricingPolicy,
    Promotion, ShopHours, TimeWindow,
};
use crate::catalog::MenuItem;
use crate::dispatch::{DispatchPolicy, RestockPlan, StaminaPolicy};
use crate::error::EngineResult;
use crate::inventory::{Resource, ResourceMap};
use crate::money::Cents;
use crate::orders::PaymentMethod;

/// Environment variable naming a JSON configuration file
pub const CONFIG_PATH_VAR: &str = "SHOP_CONFIG";

/// Complete configuration of one shop
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_shop_config"))]
pub struct ShopConfig {
    #[validate]
    pub admission: AdmissionPolicy,
    #[validate]
    pub pricing: PricingPolicy,
    #[validate]
    pub dispatch: DispatchPolicy,
    pub opening_stock: ResourceMap,
    #[validate]
    pub menu: Vec<MenuItem>,
}

fn validate_shop_config(config: &ShopConfig) -> Result<(), ValidationError> {
    if config.menu.is_empty() {
        return Err(ValidationError::new("menu_empty"));
    }

    let mut ids = HashSet::new();
    for item in &config.menu {
        if !ids.insert(item.id.as_str()) {
            return Err(ValidationError::new("duplicate_menu_item"));
        }
        if item.price <= Cents::ZERO {
            return Err(ValidationError::new("menu_price_not_positive"));
        }
    }

    let hours = config.admission.hours;
    if config
        .dispatch
        .rush_hours
        .iter()
        .any(|hour| !(hours.open_hour..hours.close_hour).contains(hour))
    {
        return Err(ValidationError::new("rush_hour_outside_opening_hours"));
    }
    Ok(())
}

impl ShopConfig {
    /// Read `.env`, then the file named by `SHOP_CONFIG`, falling back to the default shop
    pub fn load() -> EngineResult<Self> {
        dotenv::dotenv().ok();

        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                tracing::info!("Loading shop configuration from {}", path);
                Self::from_file(path)
            }
            Err(_) => {
                tracing::info!("{} not set, using the default shop", CONFIG_PATH_VAR);
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        let config: ShopConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionPolicy {
                hours: ShopHours {
                    open_hour: 7,
                    close_hour: 19,
                },
                accepted_payments: vec![PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::MobileWallet],
                delivery: DeliveryPolicy {
                    max_distance_m: 3000,
                    minimum_subtotal: Cents::new(1500),
                },
                max_quantity_per_item: 6,
            },
            pricing: PricingPolicy {
                tax_rate: Decimal::new(85, 3),
                discount_cap: Decimal::from(50),
                membership: BTreeMap::from([
                    (MembershipTier::Silver, Decimal::from(5)),
                    (MembershipTier::Gold, Decimal::from(10)),
                    (MembershipTier::Platinum, Decimal::from(15)),
                ]),
                loyalty_tiers: vec![
                    LoyaltyTier {
                        min_orders: 5,
                        percent: Decimal::from(2),
                    },
                    LoyaltyTier {
                        min_orders: 20,
                        percent: Decimal::from(5),
                    },
                ],
                time_windows: vec![TimeWindow {
                    start: "15:00".to_string(),
                    end: "17:00".to_string(),
                    percent: Decimal::from(20),
                    description: Some("Happy hour".to_string()),
                }],
                promotions: vec![Promotion {
                    code: "WELCOME10".to_string(),
                    percent: Decimal::from(10),
                    min_order: Cents::new(500),
                    usage_limit: Some(20),
                }],
            },
            dispatch: DispatchPolicy {
                hourly_customer_cap: 12,
                vip_lookahead: 3,
                rush_hours: vec![8, 12, 17],
                vip_bonus: Cents::new(200),
                stamina: StaminaPolicy {
                    initial: 100,
                    cost_per_order: 3,
                    recovery_per_hour: 5,
                    floor: 10,
                },
                critical_levels: ResourceMap::from([(Resource::Beans, 50), (Resource::Milk, 100)]),
                restock: Some(RestockPlan {
                    every_hours: 4,
                    amounts: ResourceMap::from([(Resource::Beans, 500), (Resource::Milk, 2000), (Resource::Cups, 40)]),
                }),
            },
            opening_stock: ResourceMap::from([
                (Resource::Beans, 2000),
                (Resource::Milk, 8000),
                (Resource::Water, 20000),
                (Resource::Cups, 150),
            ]),
            menu: default_menu(),
        }
    }
}

fn drink(id: &str, name: &str, price: i64, recipe: ResourceMap, prep_seconds: u32) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        category: MenuCategory::Coffee,
        price: Cents::new(price),
        status: AvailabilityStatus::Available,
        recipe,
        prep_seconds,
    }
}

fn default_menu() -> Vec<MenuItem> {
    use Resource::{Beans, Cups, Milk, Water};

    vec![
        drink("espresso", "Espresso", 300, ResourceMap::from([(Beans, 18), (Water, 30), (Cups, 1)]), 60),
        drink("americano", "Americano", 350, ResourceMap::from([(Beans, 18), (Water, 250), (Cups, 1)]), 90),
        drink(
            "latte",
            "Latte",
            450,
            ResourceMap::from([(Beans, 18), (Milk, 200), (Water, 30), (Cups, 1)]),
            180,
        ),
        drink(
            "cappuccino",
            "Cappuccino",
            425,
            ResourceMap::from([(Beans, 18), (Milk, 150), (Water, 30), (Cups, 1)]),
            150,
        ),
        drink(
            "mocha",
            "Mocha",
            500,
            ResourceMap::from([(Beans, 18), (Milk, 180), (Water, 30), (Cups, 1)]),
            210,
        ),
        MenuItem {
            category: MenuCategory::Tea,
            ..drink("green_tea", "Green Tea", 300, ResourceMap::from([(Water, 300), (Cups, 1)]), 120)
        },
        MenuItem {
            category: MenuCategory::Pastry,
            ..drink("croissant", "Butter Croissant", 325, ResourceMap::new(), 30)
        },
        MenuItem {
            status: AvailabilityStatus::Seasonal,
            ..drink(
                "pumpkin_spice_latte",
                "Pumpkin Spice Latte",
                575,
                ResourceMap::from([(Beans, 18), (Milk, 220), (Water, 30), (Cups, 1)]),
                240,
            )
        },
    ]
}
