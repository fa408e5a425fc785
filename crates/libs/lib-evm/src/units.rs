//! # Unit Conversion
//!
//! Decimal-string ↔ smallest-unit conversion for amounts typed by the user, and
//! display formatting for balances and gas prices.
//!
//! ```rust
//! use lib_evm::units::{format_balance, format_gas_price};
//!
//! assert_eq!(format_gas_price("1000000000").unwrap(), "1");
//! assert_eq!(format_balance("1000000000000000000", 5).unwrap(), "1.00000");
//! ```

use alloy_primitives::utils::{format_units, parse_units, UnitsError};
use alloy_primitives::U256;
use lib_core::ValidationError;

/// Decimals of the native currency on every supported chain.
pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals of one gwei relative to wei.
pub const GWEI_DECIMALS: u8 = 9;

/// Parse a user-typed decimal amount into the smallest unit.
///
/// Empty and zero amounts are reported as missing; anything that is not a
/// non-negative decimal with at most `decimals` fractional digits is invalid.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ValidationError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAmount);
    }
    if trimmed.starts_with('-') {
        return Err(ValidationError::InvalidAmount);
    }
    // parse_units truncates extra fractional digits instead of failing
    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(ValidationError::InvalidAmount);
        }
    }

    let value = parse_units(trimmed, decimals)
        .map_err(|_| ValidationError::InvalidAmount)?
        .get_absolute();

    if value.is_zero() {
        return Err(ValidationError::MissingAmount);
    }
    Ok(value)
}

/// Format a wei amount as gwei, without trailing zeros (`1000000000` → `"1"`).
pub fn wei_to_gwei(wei: U256) -> Result<String, UnitsError> {
    let formatted = format_units(wei, GWEI_DECIMALS)?;
    Ok(trim_fraction(&formatted))
}

/// Format a smallest-unit amount with exactly `places` fractional digits,
/// rounding half up.
pub fn format_fixed(value: U256, decimals: u8, places: usize) -> String {
    let decimals = decimals as usize;
    let ten = U256::from(10u8);

    if places >= decimals {
        if places == 0 {
            return value.to_string();
        }
        let unit = ten.pow(U256::from(decimals));
        let fraction = if decimals == 0 {
            String::new()
        } else {
            format!("{:0>width$}", (value % unit).to_string(), width = decimals)
        };
        return format!("{}.{}{}", value / unit, fraction, "0".repeat(places - decimals));
    }

    let divisor = ten.pow(U256::from(decimals - places));
    let scaled = value.saturating_add(divisor / U256::from(2u8)) / divisor;
    if places == 0 {
        return scaled.to_string();
    }

    let unit = ten.pow(U256::from(places));
    format!("{}.{:0>width$}", scaled / unit, (scaled % unit).to_string(), width = places)
}

/// Format a decimal wei string as gwei. An empty string formats as `"0"`.
pub fn format_gas_price(wei: &str) -> Result<String, UnitsError> {
    match parse_wei(wei)? {
        Some(value) => wei_to_gwei(value),
        None => Ok("0".to_string()),
    }
}

/// Format a decimal wei string as whole units with `places` fixed decimals.
/// An empty string formats as `"0"`.
pub fn format_balance(wei: &str, places: usize) -> Result<String, UnitsError> {
    Ok(match parse_wei(wei)? {
        Some(value) => format_fixed(value, NATIVE_DECIMALS, places),
        None => "0".to_string(),
    })
}

fn parse_wei(wei: &str) -> Result<Option<U256>, UnitsError> {
    let trimmed = wei.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_units(trimmed, 0u8)?.get_absolute()))
}

fn trim_fraction(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}
