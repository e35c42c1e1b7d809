//! Amount and duration formatting.
//!
//! Fixed-point rendering with an optional thousands separator. Zero-decimal
//! currencies (JPY) are rounded to whole units regardless of the configured
//! decimal places.

use crate::currency::is_zero_decimal_code;
use crate::storage::preferences::DisplaySettings;

const GROUP_SEPARATOR: char = ',';

/// Format `amount` for `currency_code` using the display preferences.
pub fn format_amount(amount: f64, currency_code: &str, prefs: &DisplaySettings) -> String {
    let fixed = if is_zero_decimal_code(currency_code) {
        // Adding 0.0 turns -0.0 into 0.0.
        format!("{:.0}", amount.round() + 0.0)
    } else {
        format!("{:.*}", prefs.decimal_places as usize, amount)
    };

    if prefs.use_thousand_separator {
        group_thousands(&fixed)
    } else {
        fixed
    }
}

/// `"{symbol} {amount}"`, the way amounts are shown next to their currency.
pub fn format_money(amount: f64, currency_code: &str, symbol: &str, prefs: &DisplaySettings) -> String {
    format!("{symbol} {}", format_amount(amount, currency_code, prefs))
}

/// Like [`format_money`] but with an explicit `+` on non-negative deltas.
pub fn format_signed_delta(delta: f64, currency_code: &str, symbol: &str, prefs: &DisplaySettings) -> String {
    let sign = if delta >= 0.0 { "+" } else { "" };
    format!("{sign}{}", format_money(delta, currency_code, symbol, prefs))
}

/// `H:MM:SS`; hours are not padded and may exceed 24.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Insert a separator every three digits of the integer part.
///
/// The fractional part and a leading minus sign are left untouched.
fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let len = int_part.len();
    let mut grouped = String::with_capacity(fixed.len() + len / 3);
    grouped.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
