use colored::Colorize;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

const MONEY_KEYS: &[&str] = &[
    "total_cost",
    "financial_impact",
    "total",
    "amount",
    "productive_cost_total",
];

const PERCENT_KEYS: &[&str] = &[
    "indirect_percentage",
    "weighted_average_deviation",
    "percent_deviation",
];

/// Render a field for humans: money with thousands separators, percentages
/// with a `%` suffix, the severity band in traffic-light colours.
pub fn display_field(key: &str, value: &Value) -> String {
    if key == "severity_band" {
        if let Value::String(band) = value {
            return match band.as_str() {
                "Favorable" => band.green().bold().to_string(),
                "Acceptable" => band.yellow().bold().to_string(),
                "Critical" => band.red().bold().to_string(),
                _ => band.clone(),
            };
        }
    }

    if let Some(d) = as_decimal(value) {
        if MONEY_KEYS.contains(&key) {
            return group_thousands(d);
        }
        if PERCENT_KEYS.contains(&key) {
            return format!("{}%", round2(d));
        }
    }
    plain(value)
}

/// Plain rendering used where no formatting rule applies.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(plain).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

fn round2(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234567.891` → `1,234,567.89`
pub fn group_thousands(d: Decimal) -> String {
    let rounded = format!("{:.2}", round2(d));
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(dec!(0)), "0.00");
        assert_eq!(group_thousands(dec!(999.999)), "1,000.00");
        assert_eq!(group_thousands(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(group_thousands(dec!(-4200.5)), "-4,200.50");
    }

    #[test]
    fn test_display_percent_and_null() {
        assert_eq!(
            display_field("indirect_percentage", &json!("27.272727")),
            "27.27%"
        );
        assert_eq!(display_field("percent_deviation", &Value::Null), "n/a");
        assert_eq!(display_field("product", &json!("PROD_A")), "PROD_A");
    }
}
