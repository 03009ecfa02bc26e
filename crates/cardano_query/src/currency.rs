//! Fixed-point rendering of integer quantities.

use crate::config::Network;
use num_bigint::BigUint;

pub const ADA_DECIMALS: usize = 6;

/// Render `value` with `decimals` fractional digits, e.g. 1500000 @ 6 → "1.500000".
pub fn to_decimal(value: &BigUint, decimals: usize) -> String {
    let text = value.to_string();
    if decimals == 0 {
        return text;
    }
    if text.len() > decimals {
        let (int, frac) = text.split_at(text.len() - decimals);
        format!("{int}.{frac}")
    } else {
        format!("0.{text:0>decimals$}")
    }
}

pub fn ada_symbol(network: Network) -> &'static str {
    if network.is_mainnet() {
        "₳"
    } else {
        "t₳"
    }
}

/// Lovelace as ADA with the network's symbol, e.g. "2.000000 ₳".
pub fn format_ada(lovelace: &BigUint, network: Network) -> String {
    format!("{} {}", to_decimal(lovelace, ADA_DECIMALS), ada_symbol(network))
}
