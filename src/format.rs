//! Cost input formatting.
//!
//! [`format_cost`] turns what a user typed or pasted into a currency string
//! while the value may still be half entered: a trailing decimal delimiter
//! and typed zero decimals are kept, and extra decimals are cut rather than
//! rounded. Attach it to a column with
//! [`Column::format_value`](crate::Column::format_value).

use serde::Deserialize;

/// Options for [`CostFormat::format`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostFormat {
    /// BCP 47 tag. Only the language part picks delimiters and symbol
    /// placement.
    pub locale: String,
    /// ISO 4217 code.
    pub currency: String,
    /// Always show two decimals.
    pub pad_decimals_with_zeros: bool,
    pub can_be_negative: bool,
    /// Empty input formats as zero instead of an empty string.
    pub default_to_zero: bool,
}

impl Default for CostFormat {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency: "USD".to_string(),
            pad_decimals_with_zeros: false,
            can_be_negative: true,
            default_to_zero: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Delimiters {
    thousands: char,
    decimal: char,
}

fn delimiters(language: &str) -> Delimiters {
    let (thousands, decimal) = match language {
        "de" => ('.', ','),
        "fr" => (' ', ','),
        _ => (',', '.'),
    };
    Delimiters { thousands, decimal }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        other => other,
    }
}

/// A parsed cost: sign, integer digits without leading zeros and the
/// decimals as typed (at most two, `Some("")` for a trailing delimiter).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Amount {
    negative: bool,
    int: String,
    frac: Option<String>,
}

impl Amount {
    fn zero() -> Self {
        Self {
            negative: false,
            int: "0".to_string(),
            frac: None,
        }
    }

    /// `None` when the filtered input is not a number, such as `5-` or
    /// `1.2.3`.
    fn parse(cost: &str, decimal: char) -> Option<Self> {
        let mut parts = cost.split(decimal);
        let int_raw = parts.next().unwrap_or_default();
        let frac_raw = parts.next();
        if parts.next().is_some() {
            return None;
        }

        let (negative, digits) = match int_raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, int_raw),
        };
        if digits.contains('-') || frac_raw.is_some_and(|f| f.contains('-')) {
            return None;
        }
        if digits.is_empty() && frac_raw.unwrap_or_default().is_empty() {
            return None;
        }

        let int = digits.trim_start_matches('0');
        Some(Self {
            negative,
            int: if int.is_empty() { "0" } else { int }.to_string(),
            frac: frac_raw.map(|f| f.chars().take(2).collect()),
        })
    }

    fn is_zero(&self) -> bool {
        self.int == "0" && self.frac.as_deref().unwrap_or_default().chars().all(|c| c == '0')
    }
}

fn group_thousands(int: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

impl CostFormat {
    fn language(&self) -> String {
        self.locale
            .split('-')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// Format raw input as a cost.
    pub fn format(&self, value: &str) -> String {
        let language = self.language();
        let delims = delimiters(&language);
        let cost: String = value
            .chars()
            .filter(|c| {
                c.is_ascii_digit() || *c == delims.decimal || (self.can_be_negative && *c == '-')
            })
            .collect();

        if cost.is_empty() || value == "." {
            return if self.default_to_zero {
                self.render(&Amount::zero(), delims, &language)
            } else {
                String::new()
            };
        }
        let amount = Amount::parse(&cost, delims.decimal).unwrap_or_else(Amount::zero);
        self.render(&amount, delims, &language)
    }

    fn render(&self, amount: &Amount, delims: Delimiters, language: &str) -> String {
        let frac = if self.pad_decimals_with_zeros {
            let typed = amount.frac.as_deref().unwrap_or_default();
            Some(format!("{typed:0<2}"))
        } else {
            amount.frac.clone()
        };

        let mut number = group_thousands(&amount.int, delims.thousands);
        if let Some(frac) = frac {
            number.push(delims.decimal);
            number.push_str(&frac);
        }

        let sign = if amount.negative && !amount.is_zero() {
            "-"
        } else {
            ""
        };
        let symbol = currency_symbol(&self.currency);
        match language {
            "de" | "fr" => format!("{sign}{number} {symbol}"),
            _ if symbol.len() > 1 && symbol.is_ascii() => format!("{sign}{symbol} {number}"),
            _ => format!("{sign}{symbol}{number}"),
        }
    }

    /// This format as a column value transform.
    pub fn into_formatter(self) -> impl Fn(&str) -> String + 'static {
        move |value: &str| self.format(value)
    }
}

/// Format `value` as US dollars with the default [`CostFormat`].
pub fn format_cost(value: &str) -> String {
    CostFormat::default().format(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("10", "$10"; "whole")]
    #[test_case("1234567", "$1,234,567"; "grouped")]
    #[test_case("$1,234.5", "$1,234.5"; "reformat own output")]
    #[test_case("12.", "$12."; "trailing delimiter kept")]
    #[test_case("12.00", "$12.00"; "typed zero decimals kept")]
    #[test_case("12.345", "$12.34"; "decimals cut not rounded")]
    #[test_case("007", "$7"; "leading zeros")]
    #[test_case("", "$0"; "empty")]
    #[test_case("abc", "$0"; "no digits")]
    #[test_case(".", "$0"; "lone delimiter")]
    #[test_case("-5", "-$5"; "negative")]
    #[test_case("-0", "$0"; "negative zero")]
    #[test_case("5-", "$0"; "misplaced sign")]
    #[test_case("1.2.3", "$0"; "two delimiters")]
    fn formats_us_dollars(input: &str, expected: &str) {
        assert_eq!(format_cost(input), expected);
    }

    #[test]
    fn padding_always_shows_cents() {
        let format = CostFormat {
            pad_decimals_with_zeros: true,
            ..CostFormat::default()
        };
        assert_eq!(format.format("12.5"), "$12.50");
        assert_eq!(format.format("12"), "$12.00");
        assert_eq!(format.format(""), "$0.00");
    }

    #[test]
    fn sign_and_empty_options() {
        let format = CostFormat {
            can_be_negative: false,
            default_to_zero: false,
            ..CostFormat::default()
        };
        assert_eq!(format.format("-5"), "$5");
        assert_eq!(format.format(""), "");
        assert_eq!(format.format("x"), "");
    }

    #[test]
    fn locale_picks_delimiters() {
        let de = CostFormat {
            locale: "de-DE".to_string(),
            currency: "EUR".to_string(),
            ..CostFormat::default()
        };
        assert_eq!(de.format("1234,5"), "1.234,5 €");
        assert_eq!(de.format("1.234"), "1.234 €");

        let fr = CostFormat {
            locale: "fr-FR".to_string(),
            currency: "EUR".to_string(),
            ..CostFormat::default()
        };
        assert_eq!(fr.format("1234,56"), "1 234,56 €");

        let chf = CostFormat {
            currency: "CHF".to_string(),
            ..CostFormat::default()
        };
        assert_eq!(chf.format("10"), "CHF 10");
    }

    #[test]
    fn options_from_json() {
        let format: CostFormat =
            serde_json::from_str(r#"{"currency":"GBP","padDecimalsWithZeros":true}"#).unwrap();
        assert_eq!(format.locale, "en-US");
        assert_eq!(format.format("3"), "£3.00");
    }
}
