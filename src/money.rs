//! Currency rounding, formatting and parsing of user-entered amounts.
//!
//! All monetary arithmetic in this crate uses `Decimal`. Values are rounded with
//! round-half-to-even ("banker's rounding") to the currency's two fractional digits before they
//! are summed or compared, and again after every sum.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// The number of fractional digits used for every currency handled by the app.
pub const CURRENCY_SCALE: u32 = 2;

/// Symbols for the currency codes that have a well-known short form. Other valid codes are
/// rendered with the code itself as a prefix, e.g. `CHF 5.00`.
const SYMBOLS: &[(&str, &str)] = &[
    ("AUD", "A$"),
    ("BRL", "R$"),
    ("CAD", "CA$"),
    ("CNY", "CN¥"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("ILS", "₪"),
    ("INR", "₹"),
    ("JPY", "¥"),
    ("KRW", "₩"),
    ("MXN", "MX$"),
    ("NZD", "NZ$"),
    ("USD", "$"),
    ("VND", "₫"),
];

/// Rounds `value` to two fractional digits using round-half-to-even.
///
/// ```
/// # use cashbook::money::round_currency;
/// # use rust_decimal::Decimal;
/// # use std::str::FromStr;
/// let v = Decimal::from_str("12.345").unwrap();
/// assert_eq!(round_currency(v).to_string(), "12.34");
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    round_to(value, CURRENCY_SCALE)
}

/// Rounds `value` to `scale` fractional digits using round-half-to-even.
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven)
}

/// Parses a user-entered amount.
///
/// Whitespace is trimmed and both `.` and `,` are accepted as the decimal separator. Returns
/// `None` for empty or unparseable input. Negative values are returned as-is; rejecting
/// non-positive amounts is up to the caller.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replace(',', ".");
    Decimal::from_str(&normalized).ok()
}

/// Returns true if `code` looks like an ISO-4217 code: exactly three ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Renders `value` as a currency string with exactly two fractional digits and thousands
/// separators, e.g. `-$1,234.50` or `CHF 12.00`.
///
/// When `currency_code` is not a usable currency code the plain number is returned instead,
/// e.g. `1234.50`.
pub fn format(value: Decimal, currency_code: &str) -> String {
    let rounded = round_currency(value);
    let code = currency_code.trim().to_ascii_uppercase();
    if !is_currency_code(&code) {
        return plain(rounded);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = grouped(rounded.abs());

    match symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{digits}"),
        None => format!("{sign}{code} {digits}"),
    }
}

fn symbol(code: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, symbol)| *symbol)
}

/// The value with exactly two fractional digits and no grouping.
fn plain(value: Decimal) -> String {
    let mut v = value;
    v.rescale(CURRENCY_SCALE);
    v.to_string()
}

/// Groups the integer digits of a non-negative value in threes, e.g. `1234567.5` becomes
/// `1,234,567.50`. Works on the decimal text so no precision is lost on large amounts.
fn grouped(value: Decimal) -> String {
    let text = plain(value);
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut out = String::with_capacity(text.len() + int.len() / 3 + 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('.');
    out.push_str(&format!("{frac:0<2}"));
    out
}

/// Adds `values` after rounding each to the currency scale, saturating at `Decimal::MAX` (or
/// `Decimal::MIN`) instead of overflowing. The result is rounded again.
pub fn sum_currency<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let total = values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(round_currency(v)));
    round_currency(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_currency(d("12.345")), d("12.34"));
        assert_eq!(round_currency(d("12.355")), d("12.36"));
        assert_eq!(round_currency(d("0.125")), d("0.12"));
        assert_eq!(round_currency(d("0.135")), d("0.14"));
        assert_eq!(round_currency(d("-2.675")), d("-2.68"));
    }

    #[test]
    fn test_round_not_a_midpoint() {
        assert_eq!(round_currency(d("12.3451")), d("12.35"));
        assert_eq!(round_currency(d("12.3449")), d("12.34"));
        assert_eq!(round_currency(d("7")), d("7"));
    }

    #[test]
    fn test_round_is_idempotent() {
        for s in ["0", "1.005", "2.5", "99.995", "-0.015", "123456.789", "0.004999"] {
            let once = round_currency(d(s));
            assert_eq!(round_currency(once), once, "value {s}");
        }
    }

    #[test]
    fn test_round_to_scale() {
        assert_eq!(round_to(d("2.5"), 0), d("2"));
        assert_eq!(round_to(d("3.5"), 0), d("4"));
        assert_eq!(round_to(d("1.23456"), 3), d("1.235"));
    }

    #[test]
    fn test_parse_decimal_dot_and_comma() {
        assert_eq!(parse_decimal("12.50"), Some(d("12.50")));
        assert_eq!(parse_decimal("12,50"), Some(d("12.50")));
        assert_eq!(parse_decimal("  7,5 \n"), Some(d("7.5")));
    }

    #[test]
    fn test_parse_decimal_negative_is_allowed() {
        assert_eq!(parse_decimal("-3"), Some(d("-3")));
    }

    #[test]
    fn test_parse_decimal_rejects_empty_and_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1.2.3"), None);
        // A comma used as a thousands separator becomes a second decimal point.
        assert_eq!(parse_decimal("1,234.56"), None);
    }

    #[test]
    fn test_format_known_symbol() {
        assert_eq!(format(d("1234.5"), "USD"), "$1,234.50");
        assert_eq!(format(d("5"), "eur"), "€5.00");
        assert_eq!(format(d("0"), "GBP"), "£0.00");
    }

    #[test]
    fn test_format_rounds_first() {
        assert_eq!(format(d("12.345"), "USD"), "$12.34");
        assert_eq!(format(d("-0.001"), "USD"), "$0.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format(d("-60000"), "USD"), "-$60,000.00");
    }

    #[test]
    fn test_format_large_amount_keeps_cents() {
        assert_eq!(
            format(d("12345678901234567.89"), "USD"),
            "$12,345,678,901,234,567.89"
        );
        assert_eq!(format(d("-100000000000000000.01"), "EUR"), "-€100,000,000,000,000,000.01");
    }

    #[test]
    fn test_format_grouping_boundaries() {
        assert_eq!(format(d("999"), "USD"), "$999.00");
        assert_eq!(format(d("1000"), "USD"), "$1,000.00");
        assert_eq!(format(d("123456"), "USD"), "$123,456.00");
        assert_eq!(format(d("0.5"), "USD"), "$0.50");
    }

    #[test]
    fn test_sum_currency_rounds_each_value() {
        assert_eq!(sum_currency([d("0.005"), d("0.015")]), d("0.02"));
        assert_eq!(sum_currency(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_sum_currency_saturates() {
        assert_eq!(sum_currency([Decimal::MAX, d("1")]), Decimal::MAX);
        assert_eq!(sum_currency([Decimal::MIN, d("-1")]), Decimal::MIN);
    }

    #[test]
    fn test_format_code_prefix() {
        assert_eq!(format(d("1000"), "CHF"), "CHF 1,000.00");
    }

    #[test]
    fn test_format_falls_back_to_plain_number() {
        assert_eq!(format(d("1234.5"), ""), "1234.50");
        assert_eq!(format(d("3"), "DOLLARS"), "3.00");
        assert_eq!(format(d("1.005"), "$$$"), "1.00");
    }

    #[test]
    fn test_is_currency_code() {
        assert!(is_currency_code("USD"));
        assert!(is_currency_code("xyz"));
        assert!(!is_currency_code("US"));
        assert!(!is_currency_code("US1"));
    }
}
