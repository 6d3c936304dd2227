//! Decimal display units ↔ base units.
//!
//! The engine only ever sees base units. These helpers are for the edges:
//! parsing what a user typed ("1.5") with a token's decimals, and rendering
//! balances and ratios back for display. Integer-only.

use crate::error::{DexError, Result};
use crate::math::U256;

/// Display precision is capped here; nothing meaningful lies beyond 18 places.
pub const MAX_DISPLAY_PLACES: u8 = 18;

/// `10^exp` as u128. `exp` is bounded by token decimals (<= 18) plus
/// display places, so callers stay well below 10^38.
fn pow10(exp: u32) -> u128 {
    10u128.pow(exp)
}

/// Parse a decimal string into base units: `parse_units("1.5", 6) == 1_500_000`.
///
/// Rejects signs, exponents, whitespace inside the number, and more
/// fractional digits than `decimals`.
pub fn parse_units(input: &str, decimals: u8) -> Result<u128> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DexError::InvalidAmount("empty amount".to_string()));
    }
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(DexError::InvalidAmount(format!("'{}' is not a number", input)));
    }
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(DexError::InvalidAmount(format!("'{}' is not a number", input)));
    }
    if frac_part.len() > decimals as usize {
        return Err(DexError::InvalidAmount(format!(
            "'{}' has more than {} decimal places",
            input, decimals
        )));
    }

    let overflow = || DexError::InvalidAmount(format!("'{}' is too large", input));
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };
    let mut frac: u128 = if frac_part.is_empty() {
        0
    } else {
        frac_part.parse().map_err(|_| overflow())?
    };
    frac *= pow10(decimals as u32 - frac_part.len() as u32);

    whole
        .checked_mul(pow10(decimals as u32))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(overflow)
}

/// Render base units as a minimal decimal string: `format_units(1_500_000, 6) == "1.5"`.
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let unit = pow10(decimals as u32);
    let whole = amount / unit;
    let frac = amount % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

/// Render base units with exactly `places` fractional digits, truncating.
pub fn format_units_fixed(amount: u128, decimals: u8, places: u8) -> String {
    let places = places.min(MAX_DISPLAY_PLACES);
    let unit = pow10(decimals as u32);
    let whole = amount / unit;
    if places == 0 {
        return whole.to_string();
    }
    let frac = amount % unit;
    let frac = if places >= decimals {
        frac * pow10((places - decimals) as u32)
    } else {
        frac / pow10((decimals - places) as u32)
    };
    format!("{}.{:0width$}", whole, frac, width = places as usize)
}

/// Display price of one whole unit of the denominator token in numerator
/// tokens, e.g. "1 MTK = 2.0000 sUSDC". `None` if the denominator is empty.
pub fn format_ratio(
    numerator: u128,
    numerator_decimals: u8,
    denominator: u128,
    denominator_decimals: u8,
    places: u8,
) -> Option<String> {
    if denominator == 0 {
        return None;
    }
    let places = places.min(MAX_DISPLAY_PLACES);
    // (num / 10^nd) / (den / 10^dd) scaled by 10^places
    let num = U256::from(numerator)
        * U256::from(pow10(denominator_decimals as u32))
        * U256::from(pow10(places as u32));
    let den = U256::from(denominator) * U256::from(pow10(numerator_decimals as u32));
    let scaled = num / den;
    if scaled.bits() > 128 {
        return None;
    }
    Some(format_units_fixed(scaled.low_u128(), places, places))
}
