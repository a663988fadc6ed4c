//! Display formatting for tables, chart labels and report slides.
//! Monetary values carry the configured currency symbol and thousands
//! separators; percentages show two decimals.

/// `1234567` → `"1,234,567"`.
pub fn count(n: usize) -> String {
    group_digits(&n.to_string())
}

/// `-1234.5, "€"` → `"€-1,234.50"`. The sign sits between the symbol and
/// the amount, matching the dashboard's reference output.
pub fn currency(value: f64, symbol: &str) -> String {
    let amount = format!("{:.2}", value.abs());
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount.as_str(), "00"));
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}{}.{}", symbol, sign, group_digits(int_part), frac_part)
}

/// `30.0` → `"30.00"`.
pub fn percent(value: f64) -> String {
    format!("{:.2}", value)
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let chars: Vec<char> = digits.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(count(0), "0");
        assert_eq!(count(999), "999");
        assert_eq!(count(1000), "1,000");
        assert_eq!(count(1234567), "1,234,567");
    }

    #[test]
    fn currency_is_signed_and_grouped() {
        assert_eq!(currency(1234.5, "€"), "€1,234.50");
        assert_eq!(currency(-98765.432, "€"), "€-98,765.43");
        assert_eq!(currency(0.0, "$"), "$0.00");
    }

    #[test]
    fn percent_shows_two_decimals() {
        assert_eq!(percent(30.0), "30.00");
        assert_eq!(percent(33.333), "33.33");
        assert_eq!(percent(2.5), "2.50");
    }
}
