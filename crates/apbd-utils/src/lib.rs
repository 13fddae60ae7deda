//! Formatting helpers for rupiah amounts and percentages

use rust_decimal::{Decimal, RoundingStrategy};

/// Number formatting conventions
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    pub symbol: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: u32,
}

impl Default for NumberFormat {
    /// id-ID conventions: `Rp 1.500.000`
    fn default() -> Self {
        Self {
            symbol: "Rp".to_string(),
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            decimal_places: 0,
        }
    }
}

impl NumberFormat {
    /// Format a number with this format's separators, no symbol
    pub fn number(&self, n: Decimal) -> String {
        let rounded = n
            .abs()
            .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.*}", self.decimal_places as usize, rounded);
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };

        let mut result = group_digits(int_part, &self.thousands_separator);
        if let Some(frac) = frac_part {
            result.push_str(&self.decimal_separator);
            result.push_str(frac);
        }
        if n.is_sign_negative() && !rounded.is_zero() {
            result.insert(0, '-');
        }
        result
    }

    /// Format an amount with the currency symbol, e.g. `Rp 1.500.000`
    pub fn currency(&self, amount: Decimal) -> String {
        let body = self.number(amount.abs());
        let negative = amount.is_sign_negative()
            && !amount
                .round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
                .is_zero();
        if negative {
            format!("-{} {}", self.symbol, body)
        } else {
            format!("{} {}", self.symbol, body)
        }
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Format a number with `.` thousands separators, rounded to a whole number
pub fn format_number(n: Decimal) -> String {
    NumberFormat::default().number(n)
}

/// Format a rupiah amount, e.g. `Rp 1.500.000`
pub fn format_rupiah(amount: Decimal) -> String {
    NumberFormat::default().currency(amount)
}

/// Compact rupiah: `Rp 1.5T`, `Rp 2.3M`, `Rp 4.0Jt`, `Rp 7.5Rb`
pub fn format_rupiah_compact(amount: Decimal) -> String {
    const UNITS: [(i64, &str); 4] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "M"),
        (1_000_000, "Jt"),
        (1_000, "Rb"),
    ];

    let scaled = |scale: i64| {
        (amount / Decimal::from(scale))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };

    for (i, (scale, suffix)) in UNITS.iter().enumerate() {
        if amount >= Decimal::from(*scale) {
            let value = scaled(*scale);
            // 999.95 Rb rounds to 1000.0 Rb, which reads as 1.0 Jt
            if value >= Decimal::ONE_THOUSAND && i > 0 {
                let (larger, larger_suffix) = UNITS[i - 1];
                return format!("Rp {:.1}{}", scaled(larger), larger_suffix);
            }
            return format!("Rp {:.1}{}", value, suffix);
        }
    }
    format_rupiah(amount)
}

/// Format a percentage with one decimal, e.g. `12.5%`
pub fn format_percentage(p: f64) -> String {
    format!("{:.1}%", p)
}
