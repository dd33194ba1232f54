// Validation utilities module
// Shared checks used by the struct-level validators of requests and configuration

use chrono::NaiveTime;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use validator::ValidationError;

/// Promotion codes: 3 to 16 upper-case letters or digits
fn promo_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{3,16}$").expect("promo code pattern is valid"))
}

/// Validates a promotion code's format
pub fn validate_promo_code(code: &str) -> Result<(), ValidationError> {
    if promo_code_pattern().is_match(code) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_promo_code"))
    }
}

/// Validates that a percentage lies within 0..=100
pub fn validate_percentage(value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        Err(ValidationError::new("percentage_out_of_range"))
    } else {
        Ok(())
    }
}

/// Validates that a rate lies within 0..=1 (e.g. a tax rate of 0.085)
pub fn validate_rate(value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        Err(ValidationError::new("rate_out_of_range"))
    } else {
        Ok(())
    }
}

/// Parses an "HH:MM" time of day
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Validates an "HH:MM" time of day
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    parse_time_of_day(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("invalid_time_of_day"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_promo_code_format() {
        assert!(validate_promo_code("SPRING24").is_ok());
        assert!(validate_promo_code("AB").is_err());
        assert!(validate_promo_code("spring24").is_err());
        assert!(validate_promo_code("SPRING-24").is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage(dec!(0)).is_ok());
        assert!(validate_percentage(dec!(100)).is_ok());
        assert!(validate_percentage(dec!(-1)).is_err());
        assert!(validate_percentage(dec!(100.5)).is_err());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(validate_rate(dec!(0.085)).is_ok());
        assert!(validate_rate(dec!(8.5)).is_err());
    }

    #[test]
    fn test_time_of_day() {
        assert_eq!(parse_time_of_day("15:30"), NaiveTime::from_hms_opt(15, 30, 0));
        assert!(validate_time_of_day("25:00").is_err());
        assert!(validate_time_of_day("3pm").is_err());
    }
}
