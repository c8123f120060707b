use alloy::primitives::utils as alloy_units;
use alloy::primitives::{Address, B256, U256};

use crate::data::error::AmountError;

/// Decimal exponent of the token and of ETH.
pub const TOKEN_DECIMALS: u8 = 18;

/// Fractional digits shown for every amount.
pub const DISPLAY_DECIMALS: u8 = 4;

/// Truncate a B256 hash to "0xabcd...ef12" format
pub fn truncate_hash(hash: &B256) -> String {
    truncate_hex(format!("{hash}"))
}

/// Truncate an address to "0xabcd...ef12" format
pub fn truncate_address(addr: &Address) -> String {
    truncate_hex(format!("{addr}"))
}

fn truncate_hex(s: String) -> String {
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s
    }
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Explorer URL for an address or transaction, e.g. "{base}/address/0x..".
pub fn explorer_link(base: &str, kind: &str, id: &str) -> String {
    format!("{}/{kind}/{id}", base.trim_end_matches('/'))
}

/// Format a minor-unit value as a decimal rounded half-up to exactly `shown`
/// fractional digits. Only the text is rounded.
pub fn format_units_fixed(value: U256, decimals: u8, shown: u8) -> String {
    let shown = shown.min(decimals);
    let dropped = u32::from(decimals - shown);
    let scaled = if dropped == 0 {
        value
    } else {
        let step = U256::from(10u64).pow(U256::from(dropped));
        let (quotient, remainder) = value.div_rem(step);
        if remainder >= step / U256::from(2u64) {
            quotient + U256::from(1u64)
        } else {
            quotient
        }
    };

    if shown == 0 {
        return scaled.to_string();
    }
    let unit = U256::from(10u64).pow(U256::from(shown));
    let whole = scaled / unit;
    let frac = scaled % unit;
    format!("{whole}.{:0>width$}", frac.to_string(), width = shown as usize)
}

/// Amount column text: 18-decimal value with 4 fractional digits.
pub fn format_amount(value: U256) -> String {
    format_units_fixed(value, TOKEN_DECIMALS, DISPLAY_DECIMALS)
}

/// Parse an unsigned decimal string into minor units. Fractional digits
/// beyond `decimals` are truncated.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::Malformed(input.to_string()));
    }

    // Truncate rather than let alloy reject the extra precision.
    let frac: String = frac.chars().take(decimals as usize).collect();
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    };
    alloy_units::parse_units(&normalized, decimals)
        .map(|units| units.get_absolute())
        .map_err(|_| AmountError::Overflow(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_truncate_address() {
        let addr: Address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".parse().unwrap();
        assert_eq!(truncate_address(&addr), "0xd8dA6B...6045");
    }

    #[test]
    fn test_truncate_hash() {
        let hash = B256::repeat_byte(0xab);
        assert_eq!(truncate_hash(&hash), "0xababab...abab");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(19234567), "19,234,567");
    }

    #[test]
    fn test_explorer_link() {
        assert_eq!(
            explorer_link("http://localhost:3000/blockexplorer/", "tx", "0xab"),
            "http://localhost:3000/blockexplorer/tx/0xab"
        );
    }

    #[test]
    fn test_format_amount_exact() {
        assert_eq!(format_amount(U256::from(1_234_500_000_000_000_000u64)), "1.2345");
    }

    #[test]
    fn test_format_amount_zero() {
        assert_eq!(format_amount(U256::ZERO), "0.0000");
    }

    #[test]
    fn test_format_amount_whole() {
        assert_eq!(format_amount(ether(42)), "42.0000");
    }

    #[test]
    fn test_format_amount_rounds_half_up() {
        assert_eq!(format_amount(U256::from(1_234_560_000_000_000_000u64)), "1.2346");
        assert_eq!(format_amount(U256::from(1_234_549_999_999_999_999u64)), "1.2345");
        assert_eq!(format_amount(U256::from(50_000_000_000_000u64)), "0.0001");
        assert_eq!(format_amount(U256::from(49_999_999_999_999u64)), "0.0000");
    }

    #[test]
    fn test_format_amount_rounds_into_whole() {
        assert_eq!(format_amount(U256::from(999_950_000_000_000_000u64)), "1.0000");
    }

    #[test]
    fn test_format_amount_huge_does_not_panic() {
        let text = format_amount(U256::MAX);
        assert_eq!(text.split('.').nth(1).unwrap().len(), 4);
    }

    #[test]
    fn test_format_units_fixed_rounds_near_max() {
        // U256::MAX ends in ...639935, which rounds up at one dropped digit.
        let max = U256::MAX.to_string();
        let expected_whole = &max[..max.len() - 2];
        assert!(max.ends_with("35"));
        assert_eq!(
            format_units_fixed(U256::MAX, 2, 1),
            format!("{expected_whole}.4")
        );
    }

    #[test]
    fn test_format_units_fixed_other_widths() {
        assert_eq!(format_units_fixed(U256::from(123456u64), 6, 2), "0.12");
        assert_eq!(format_units_fixed(U256::from(1500u64), 3, 0), "2");
        assert_eq!(format_units_fixed(U256::from(15u64), 2, 4), "0.15");
    }

    #[test]
    fn test_parse_units_whole_and_fraction() {
        assert_eq!(parse_units("1", 18).unwrap(), ether(1));
        assert_eq!(
            parse_units("1.5", 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(
            parse_units(".25", 18).unwrap(),
            U256::from(250_000_000_000_000_000u64)
        );
        assert_eq!(parse_units("2.", 18).unwrap(), ether(2));
        assert_eq!(parse_units(" 10 ", 18).unwrap(), ether(10));
    }

    #[test]
    fn test_parse_units_zero() {
        assert_eq!(parse_units("0", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_units("0.000", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_parse_units_smallest_unit() {
        assert_eq!(
            parse_units("0.000000000000000001", 18).unwrap(),
            U256::from(1u64)
        );
    }

    #[test]
    fn test_parse_units_truncates_extra_digits() {
        assert_eq!(
            parse_units("0.0000000000000000019", 18).unwrap(),
            U256::from(1u64)
        );
    }

    #[test]
    fn test_parse_units_rejects_empty() {
        assert_eq!(parse_units("", 18), Err(AmountError::Empty));
        assert_eq!(parse_units("   ", 18), Err(AmountError::Empty));
    }

    #[test]
    fn test_parse_units_rejects_malformed() {
        for bad in [".", "abc", "1.2.3", "-1", "1e18", "1,5", "+2"] {
            assert!(
                matches!(parse_units(bad, 18), Err(AmountError::Malformed(_))),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_units_overflow() {
        let huge = "9".repeat(80);
        assert!(matches!(parse_units(&huge, 18), Err(AmountError::Overflow(_))));
    }
}
