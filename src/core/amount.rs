//! Parsing and formatting of user-facing amounts and rates

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fractional digits used for every derived amount.
pub const AMOUNT_DECIMALS: u32 = 2;

/// The numeric reading of an amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Blank text. Accepted, and clears the field.
    Empty,
    Value(Decimal),
}

/// Coerces user text into an [`Amount`].
///
/// Surrounding whitespace is ignored. Accepted forms are an optional sign,
/// digits with at most one decimal point (`.5` and `5.` included) and an
/// optional decimal exponent. Returns `None` for anything else, including
/// values `Decimal` cannot hold: an exponent pushing the scale past 28
/// (`1e-29`) or a magnitude past `Decimal::MAX` (`1e29`).
pub fn parse_amount(text: &str) -> Option<Amount> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Amount::Empty);
    }

    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let mut normalized = String::with_capacity(text.len() + 2);
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_part);
    }

    let value = match exponent {
        None => Decimal::from_str(&normalized).ok()?,
        Some(exp) => {
            let (exp_negative, digits) = match exp.as_bytes().first() {
                Some(b'-') => (true, &exp[1..]),
                Some(b'+') => (false, &exp[1..]),
                _ => (false, exp),
            };
            if digits.is_empty() || !all_digits(digits) {
                return None;
            }
            let sign = if exp_negative { "-" } else { "" };
            Decimal::from_scientific(&format!("{normalized}e{sign}{digits}")).ok()?
        }
    };

    Some(Amount::Value(value))
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Rounds to two decimals, midpoint away from zero.
pub fn round_amount(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // Drops a negative sign left over from rounding tiny negatives.
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Plain decimal text with exactly two fractional digits, as written into the amount fields.
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_amount(value))
}

/// Localized currency rendering for rate displays, e.g. `Bs.S 1.234,56`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimal_separator: char,
    pub group_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "Bs.S".to_string(),
            decimal_separator: ',',
            group_separator: '.',
        }
    }
}

impl CurrencyFormat {
    pub fn format(&self, value: Decimal) -> String {
        let rounded = round_amount(value);
        let plain = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((&plain, "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        format!(
            "{sign}{} {grouped}{}{frac_part}",
            self.symbol, self.decimal_separator
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(s: &str) -> Option<Amount> {
        Some(Amount::Value(Decimal::from_str(s).unwrap()))
    }

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_amount("10"), value("10"));
        assert_eq!(parse_amount("36.50"), value("36.50"));
        assert_eq!(parse_amount("-3"), value("-3"));
        assert_eq!(parse_amount("+7.25"), value("7.25"));
        assert_eq!(parse_amount("  42  "), value("42"));
    }

    #[test]
    fn test_parse_partial_decimals() {
        assert_eq!(parse_amount(".5"), value("0.5"));
        assert_eq!(parse_amount("5."), value("5"));
        assert_eq!(parse_amount("-.25"), value("-0.25"));
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(parse_amount("1e3"), value("1000"));
        assert_eq!(parse_amount("2.5E-1"), value("0.25"));
        assert_eq!(parse_amount("1e+2"), value("100"));
        assert_eq!(parse_amount("1e"), None);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(parse_amount("1e-29"), None);
        assert_eq!(parse_amount("1e29"), None);
        assert_eq!(parse_amount("99999999999999999999999999999"), None);
        assert_eq!(parse_amount("1e28"), value("10000000000000000000000000000"));
    }

    #[test]
    fn test_parse_empty_is_accepted() {
        assert_eq!(parse_amount(""), Some(Amount::Empty));
        assert_eq!(parse_amount("   "), Some(Amount::Empty));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        for text in ["abc", ".", "-", "1.2.3", "1,000", "0x1F", "Infinity", "NaN", "12a", "--1"] {
            assert_eq!(parse_amount(text), None, "expected {text:?} to be rejected");
        }
    }

    #[test]
    fn test_format_amount_two_decimals() {
        assert_eq!(format_amount(Decimal::new(365, 0)), "365.00");
        assert_eq!(format_amount(Decimal::new(38250, 3)), "38.25");
        assert_eq!(format_amount(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_amount(Decimal::new(-1, 3)), "0.00");
    }

    #[test]
    fn test_currency_format_es_ve() {
        let fmt = CurrencyFormat::default();
        assert_eq!(fmt.format(Decimal::new(3650, 2)), "Bs.S 36,50");
        assert_eq!(fmt.format(Decimal::new(123456789, 2)), "Bs.S 1.234.567,89");
        assert_eq!(fmt.format(Decimal::new(100000, 2)), "Bs.S 1.000,00");
        assert_eq!(fmt.format(Decimal::new(-50, 1)), "-Bs.S 5,00");
    }

    #[test]
    fn test_currency_format_custom() {
        let fmt = CurrencyFormat {
            symbol: "VES".to_string(),
            decimal_separator: '.',
            group_separator: ',',
        };
        assert_eq!(fmt.format(Decimal::new(1234567, 1)), "VES 123,456.70");
    }
}
