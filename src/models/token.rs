use ethers::types::U256;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYMBOL: &str = "UNKNOWN";
pub const DEFAULT_DECIMALS: u8 = 18;
pub const DEFAULT_NAME: &str = "Unknown Token";

/// ERC20 metadata used for reporting. Never cached between lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenDetails {
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
}

impl Default for TokenDetails {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            name: DEFAULT_NAME.to_string(),
        }
    }
}

impl TokenDetails {
    /// Render a raw token amount using these details' decimals
    pub fn format_amount(&self, amount: U256) -> String {
        format_token_amount(amount, self.decimals)
    }
}

/// Format `amount / 10^decimals` as a decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept, so `1_000_000` with 6 decimals renders as `1.0` and `1000` as `0.001`.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{}.{}", whole, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_details() {
        let details = TokenDetails::default();
        assert_eq!(details.symbol, "UNKNOWN");
        assert_eq!(details.decimals, 18);
        assert_eq!(details.name, "Unknown Token");
    }

    #[test]
    fn test_format_small_amount() {
        assert_eq!(format_token_amount(U256::from(1000u64), 6), "0.001");
        assert_eq!(format_token_amount(U256::from(1u64), 18), "0.000000000000000001");
    }

    #[test]
    fn test_format_whole_amounts() {
        assert_eq!(format_token_amount(U256::from(1_000_000u64), 6), "1.0");
        assert_eq!(format_token_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_token_amount(U256::exp10(18) * 42, 18), "42.0");
    }

    #[test]
    fn test_format_zero_and_no_decimals() {
        assert_eq!(format_token_amount(U256::zero(), 18), "0.0");
        assert_eq!(format_token_amount(U256::from(250u64), 0), "250.0");
    }

    #[test]
    fn test_format_large_decimals_does_not_overflow() {
        let formatted = format_token_amount(U256::from(5u64), 200);
        assert!(formatted.starts_with("0.000"));
        assert!(formatted.ends_with('5'));
    }

    #[test]
    fn test_details_format_amount() {
        let details = TokenDetails {
            symbol: "USDC".to_string(),
            decimals: 6,
            name: "USD Coin".to_string(),
        };
        assert_eq!(details.format_amount(U256::from(2_345_000u64)), "2.345");
    }
}
