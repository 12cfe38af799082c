//! Display helpers shared by the aggregator and the render layer.

use std::time::Duration;

/// Percentage saved when a variant drops from `regular` to `special`
/// (both in minor currency units), rounded to the nearest whole percent.
///
/// Returns `0` when either price is zero or negative, or when the special
/// price is not actually lower than the regular price.
///
/// ```
/// assert_eq!(dispo_core::calculate_discount(1000, 750), 25);
/// ```
#[must_use]
pub fn calculate_discount(regular: i64, special: i64) -> u32 {
    if regular <= 0 || special <= 0 || special >= regular {
        return 0;
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let percent = (((regular - special) as f64 / regular as f64) * 100.0).round() as u32;
    percent
}

/// Formats minor currency units as a dollar string, e.g. `1250` → `"$12.50"`.
#[must_use]
pub fn format_price(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

/// Wall-clock seconds rounded to two decimal places.
#[must_use]
pub fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}
