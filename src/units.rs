//! Display scaling of smallest-unit integer amounts

use alloy_primitives::utils::{format_units, UnitsError};
use alloy_primitives::U256;

/// Render `amount / 10^decimals` as an exact decimal string.
///
/// Trailing zeros are trimmed but one fractional digit is always kept, so
/// whole amounts read `"100.0"` and zero reads `"0.0"`.
pub fn format_display(amount: U256, decimals: u8) -> Result<String, UnitsError> {
    let formatted = format_units(amount, decimals)?;

    let Some((whole, fraction)) = formatted.split_once('.') else {
        return Ok(format!("{formatted}.0"));
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Ok(format!("{whole}.0"))
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}
