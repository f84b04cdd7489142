//! Supplier price → catalog price.

use crate::domain::PricingTier;
use crate::feed::record::Field;
use serde_json::Value;

/// Fixed markup applied on top of the margin. Not the display VAT divisor.
pub const MARKUP: f64 = 1.20;

/// Margin used when no tier matches.
pub const DEFAULT_MARGIN: f64 = 1.0;

/// Reads `price.price`: numbers as-is, strings with the first `,` taken as
/// the decimal separator and only the leading numeric part parsed.
/// Anything missing or unparseable is `0`.
pub fn supplier_price(price: Field<'_>) -> f64 {
    let parsed = match price.value() {
        Some(Value::Number(n)) => n.as_f64(),
        Some(_) => price.text().and_then(|t| parse_leading_decimal(&t.replacen(',', ".", 1))),
        None => None,
    };
    parsed.filter(|p| p.is_finite()).unwrap_or(0.0)
}

/// First tier in stored order containing `price`, not the narrowest one.
pub fn select_margin(tiers: &[PricingTier], price: f64) -> f64 {
    tiers.iter().find(|t| t.contains(price)).map_or(DEFAULT_MARGIN, |t| t.margin)
}

/// `round(price × rate × margin × 1.20)` evaluated left to right.
pub fn catalog_price(price: f64, exchange_rate: f64, tiers: &[PricingTier]) -> i64 {
    let margin = select_margin(tiers, price);
    let excluding_vat = price * exchange_rate * margin;
    round_half_up(excluding_vat * MARKUP)
}

/// Nearest integer, halves rounded towards positive infinity.
pub fn round_half_up(x: f64) -> i64 {
    if !x.is_finite() { return 0; }
    let floor = x.floor();
    let rounded = if x - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Longest leading `[+-]digits[.digits][e[+-]digits]` prefix after leading
/// whitespace, e.g. `"12.5 EUR"` → `12.5`.
fn parse_leading_decimal(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) { end += 1; }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() { end += 1; }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() { frac_end += 1; }
        digits += frac_end - frac_start;
        if digits > 0 { end = frac_end; }
    }
    if digits == 0 { return None; }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) { exp_end += 1; }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() { exp_end += 1; }
        if exp_end > exp_digits { end = exp_end; }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price_of(raw: serde_json::Value) -> f64 { supplier_price(Field::root(&raw).get("price")) }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(price_of(json!({"price": "123,45"})), 123.45);
        assert_eq!(price_of(json!({"price": "99.90"})), 99.9);
        assert_eq!(price_of(json!({"price": 250})), 250.0);
    }

    #[test]
    fn test_unparseable_price_is_zero() {
        assert_eq!(price_of(json!({"price": "n/a"})), 0.0);
        assert_eq!(price_of(json!({})), 0.0);
        assert_eq!(price_of(json!({"price": ""})), 0.0);
    }

    #[test]
    fn test_leading_numeric_prefix() {
        assert_eq!(parse_leading_decimal("  12.5 EUR"), Some(12.5));
        assert_eq!(parse_leading_decimal("1.234.56"), Some(1.234));
        assert_eq!(parse_leading_decimal("-3"), Some(-3.0));
        assert_eq!(parse_leading_decimal(".5"), Some(0.5));
        assert_eq!(parse_leading_decimal("2e3x"), Some(2000.0));
        assert_eq!(parse_leading_decimal("7e"), Some(7.0));
        assert_eq!(parse_leading_decimal("."), None);
    }

    #[test]
    fn test_reference_price() {
        let tiers = vec![PricingTier::new(0.0, Some(1000.0), 1.5)];
        assert_eq!(catalog_price(500.0, 1.0, &tiers), 900);
    }

    #[test]
    fn test_first_matching_tier_wins() {
        let tiers = vec![PricingTier::new(0.0, Some(1000.0), 1.5), PricingTier::new(0.0, Some(500.0), 2.0)];
        assert_eq!(select_margin(&tiers, 200.0), 1.5);
    }

    #[test]
    fn test_no_tier_means_unit_margin() {
        let tiers = vec![PricingTier::new(0.0, Some(1000.0), 1.5)];
        assert_eq!(select_margin(&tiers, 2000.0), DEFAULT_MARGIN);
        assert_eq!(catalog_price(2000.0, 7.5, &tiers), round_half_up(2000.0 * 7.5 * 1.0 * 1.20));
        assert_eq!(catalog_price(2000.0, 1.0, &tiers), 2400);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(f64::NAN), 0);
    }
}
