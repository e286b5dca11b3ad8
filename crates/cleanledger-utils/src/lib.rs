//! Utility functions and helpers

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Format the integer part of a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Render an amount as currency, e.g. `$1,234.50`
pub fn display_currency(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp(2);
    let text = format!("{:.2}", rounded);
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, format_number(whole), frac)
}

/// Render a date the way transaction lists show it, e.g. `15 Jun 2024`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}
