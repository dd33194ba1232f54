// Money
//
// Fixed-point monetary amounts in integer minor units (cents).
// Percentages are applied through rust_decimal and rounded back to whole cents.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Amount of money in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(cents: i64) -> Self {
        Cents(cents)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Apply a percentage (e.g. `25` for 25%) and round half away from zero.
    pub fn percent(self, percent: Decimal) -> Cents {
        self.scale(percent / Decimal::ONE_HUNDRED)
    }

    /// Multiply by a rate (e.g. `0.085`) and round half away from zero.
    pub fn scale(self, rate: Decimal) -> Cents {
        let exact = Decimal::from(self.0) * rate;
        let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        // Amounts are bounded by i64 cents times a small rate
        Cents(rounded.to_i64().unwrap_or(i64::MAX))
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Cents {
        Cents(self.0 - rhs.0)
    }
}

impl Mul<u32> for Cents {
    type Output = Cents;

    fn mul(self, quantity: u32) -> Cents {
        Cents(self.0 * i64::from(quantity))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_of_round_amount() {
        assert_eq!(Cents::new(1000).percent(dec!(25)), Cents::new(250));
    }

    #[test]
    fn test_scale_rounds_half_away_from_zero() {
        // 750 * 0.085 = 63.75
        assert_eq!(Cents::new(750).scale(dec!(0.085)), Cents::new(64));
        // 10 * 0.05 = 0.5
        assert_eq!(Cents::new(10).scale(dec!(0.05)), Cents::new(1));
        // 10 * 0.04 = 0.4
        assert_eq!(Cents::new(10).scale(dec!(0.04)), Cents::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cents::new(814).to_string(), "$8.14");
        assert_eq!(Cents::new(5).to_string(), "$0.05");
        assert_eq!(Cents::new(-250).to_string(), "-$2.50");
    }

    #[test]
    fn test_sum_and_mul() {
        let total: Cents = vec![Cents::new(450) * 2, Cents::new(375)].into_iter().sum();
        assert_eq!(total, Cents::new(1275));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Zero and one hundred percent are exact
        #[test]
        fn prop_percent_bounds(cents in 0i64..=10_000_000) {
            let amount = Cents::new(cents);
            prop_assert_eq!(amount.percent(Decimal::ZERO), Cents::ZERO);
            prop_assert_eq!(amount.percent(Decimal::ONE_HUNDRED), amount);
        }

        /// A percentage of a non-negative amount never exceeds the amount
        #[test]
        fn prop_percent_within_amount(cents in 0i64..=10_000_000, pct in 0u32..=100) {
            let amount = Cents::new(cents);
            let part = amount.percent(Decimal::from(pct));
            prop_assert!(part >= Cents::ZERO);
            prop_assert!(part <= amount);
        }
    }
}
