use ordered_float::OrderedFloat;

/// Largest integer value exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Safely converts a `u64` to `f64` if and only if it is exactly representable.
///
/// ## Errors
/// Returns `Err(error)` if the value exceeds `MAX_SAFE_U64_INT`.
///
/// ## Example
/// ```
/// use lilt::util::num::{MAX_SAFE_U64_INT, u64_to_f64_checked};
///
/// assert_eq!(u64_to_f64_checked(1234, "too big").unwrap(), 1234.0);
/// assert!(u64_to_f64_checked(MAX_SAFE_U64_INT + 1, "too big").is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn u64_to_f64_checked<E>(value: u64, error: E) -> Result<f64, E> {
    if value > MAX_SAFE_U64_INT {
        return Err(error);
    }
    Ok(value as f64)
}

/// Safely converts a `usize` to `f64` if and only if it is exactly
/// representable.
///
/// ## Errors
/// Returns `Err(error)` if the value cannot be represented without loss.
pub fn usize_to_f64_checked<E>(value: usize, error: E) -> Result<f64, E> {
    match u64::try_from(value) {
        Ok(v) => u64_to_f64_checked(v, error),
        Err(_) => Err(error),
    }
}

/// Parses the digits of a hexadecimal literal (without the `0x` prefix).
///
/// Returns `None` when there are no digits, a digit is not hexadecimal, or
/// the value does not fit exactly into an `f64`.
///
/// ## Example
/// ```
/// use lilt::util::num::parse_hex_digits;
///
/// assert_eq!(parse_hex_digits("ff"), Some(255.0));
/// assert_eq!(parse_hex_digits(""), None);
/// assert_eq!(parse_hex_digits("fg"), None);
/// ```
#[must_use]
pub fn parse_hex_digits(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let value = u64::from_str_radix(digits, 16).ok()?;
    u64_to_f64_checked(value, ()).ok()
}

/// Formats a number the way the language prints it.
///
/// Integral values are printed without a fractional part, everything else
/// uses the shortest round-trip representation.
///
/// ## Example
/// ```
/// use lilt::util::num::format_number;
/// use ordered_float::OrderedFloat;
///
/// assert_eq!(format_number(OrderedFloat(7.0)), "7");
/// assert_eq!(format_number(OrderedFloat(-2.5)), "-2.5");
/// ```
#[must_use]
pub fn format_number(value: OrderedFloat<f64>) -> String {
    let v = value.into_inner();
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= 9_007_199_254_740_991.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}
