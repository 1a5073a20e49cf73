//! Base unit conversion for native currency amounts.

use crate::error::{Result, WalletError};

pub const ETHER_DECIMALS: u32 = 18;

/// Parse a JSON-RPC quantity (`"0x14d1120d7b160000"`).
pub fn parse_quantity(raw: &str) -> Result<u128> {
    let hex = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidResponse(format!("quantity {:?} is not hex", raw)))?;
    if hex.is_empty() {
        return Err(WalletError::InvalidResponse("empty quantity".to_string()));
    }
    u128::from_str_radix(hex, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("quantity {:?}: {}", raw, e)))
}

/// Render `value` base units as a decimal string with `decimals` places,
/// trailing zeros trimmed.
pub fn format_units(value: u128, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (whole, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

pub fn format_ether(wei: u128) -> String {
    format_units(wei, ETHER_DECIMALS)
}
