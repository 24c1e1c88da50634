//! Render-time derivations of a [`Book`]. Nothing here mutates the book.

use super::models::Book;

/// Converts a listing price such as `"$12.34"` into local currency units:
/// `integer_part * major_rate + fractional_part * minor_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceConversion {
    pub major_rate: i64,
    pub minor_rate: i64,
}

impl Default for PriceConversion {
    fn default() -> Self {
        PriceConversion {
            major_rate: 1300,
            minor_rate: 13,
        }
    }
}

impl PriceConversion {
    /// Malformed components count as `0`; this never fails.
    pub fn to_local_units(&self, price: &str) -> i64 {
        let mut chars = price.trim().chars();
        // Drop the currency prefix, whatever it is.
        chars.next();
        let amount = chars.as_str();

        let (major, minor) = amount.split_once('.').unwrap_or((amount, ""));
        let major = major.trim().parse::<i64>().unwrap_or(0);
        let minor = minor.trim().parse::<i64>().unwrap_or(0);

        major
            .saturating_mul(self.major_rate)
            .saturating_add(minor.saturating_mul(self.minor_rate))
    }

    pub fn format(&self, price: &str, labels: &DisplayLabels) -> String {
        let units = self.to_local_units(price);
        if units == 0 {
            return labels.free.clone();
        }
        format!("{} {}", labels.currency_symbol, group_thousands(units))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLabels {
    pub free: String,
    pub no_subtitle: String,
    pub memo_placeholder: String,
    pub currency_symbol: String,
}

impl Default for DisplayLabels {
    fn default() -> Self {
        DisplayLabels {
            free: "Free".into(),
            no_subtitle: "No Subtitle..".into(),
            memo_placeholder: "Enter a memo".into(),
            currency_symbol: "₩".into(),
        }
    }
}

pub fn subtitle_or<'a>(book: &'a Book, labels: &'a DisplayLabels) -> &'a str {
    if book.subtitle.is_empty() {
        &labels.no_subtitle
    } else {
        &book.subtitle
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
