//! Utility functions for formatting and common operations
//!
//! Centralized formatting so currency and percentage values render the same
//! way everywhere in the CLI output.

use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include the rupee sign prefix
    Inr,
    /// No currency symbol (for table cells)
    None,
}

/// Format a Decimal using Indian digit grouping: the last three digits form
/// one group, every group above that has two (12,34,56,789.00).
pub fn format_currency_with_symbol(value: Decimal, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs();

    let formatted = format!("{:.2}", abs_value);
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        let remaining = digits.len() - i;
        // Separators fall before the last 3 digits, then every 2 above that.
        if i > 0 && (remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0)) {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Inr => "₹ ",
        CurrencySymbol::None => "",
    };

    format!("{}{}{}.{}", prefix, sign, grouped, decimal_part)
}

/// Format as rupees with symbol: "₹ 1,23,456.78"
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_symbol(value, CurrencySymbol::Inr)
}

/// Format a number with Indian grouping, no symbol: "1,23,456.78"
pub fn format_amount(value: Decimal) -> String {
    format_currency_with_symbol(value, CurrencySymbol::None)
}

/// Format a fractional change as a percentage: 0.0234 -> "2.34%"
pub fn format_pct(fraction: Decimal) -> String {
    format!("{:.2}%", fraction * Decimal::from(100))
}
