//! Numeric helpers centralizing rounding and safe numeric casts.

use num_traits::cast::cast;

use crate::constants::ROUNDING_DECIMALS;

/// Round a f64 to the accounting precision, returning 0.0 for non-finite values.
///
/// Every cut and every accumulation passes through here so repeated
/// subtraction cannot leave a fractional remainder like `0.30000000000000004`.
#[must_use]
pub fn round_currency(value: f64) -> f64 {
    round_to_decimals(value, ROUNDING_DECIMALS)
}

/// Round a f64 to `decimals` places, returning 0.0 for non-finite values.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scale = 10_f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    // Normalize -0.0 so depleted budgets compare and print as plain zero.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Convert a u32 count to f64 in a single location.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    f64::from(value)
}

/// Compare two currency values at the accounting precision.
#[must_use]
pub fn currency_eq(a: f64, b: f64) -> bool {
    round_currency(a - b) == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_currency_removes_float_noise() {
        assert_eq!(round_currency(0.1 + 0.2), 0.3);
        assert_eq!(round_currency(8.1 - 8.1), 0.0);
        assert_eq!(round_currency(0.388 - 0.387_999_999_9), 0.0);
        assert_eq!(round_currency(f64::NAN), 0.0);
    }

    #[test]
    fn round_currency_never_returns_negative_zero() {
        let value = round_currency(-0.000_1);
        assert_eq!(value, 0.0);
        assert!(value.is_sign_positive());
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn currency_eq_tolerates_sub_precision_drift() {
        assert!(currency_eq(88.0, 87.999_9));
        assert!(!currency_eq(88.0, 87.99));
    }
}
