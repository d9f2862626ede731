use serde_json::Value;

use super::format::display_field;

/// Print just the headline figure from the output.
///
/// Looks for the dashboard KPIs in order of priority; row-shaped results
/// print their first row; anything else falls back to the first field.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = [
        "weighted_average_deviation",
        "total_cost",
        "financial_impact",
        "periods",
        "directory",
    ];

    match result_obj {
        Value::Object(map) => {
            for key in &priority_keys {
                if let Some(val) = map.get(*key) {
                    if !val.is_null() {
                        println!("{}", display_field(key, val));
                        return;
                    }
                }
            }

            // Fall back to first field
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, display_field(key, val));
            }
        }
        Value::Array(rows) => match rows.first() {
            Some(Value::Object(first)) => {
                let line: Vec<String> = first
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, display_field(k, v)))
                    .collect();
                println!("{}", line.join(" "));
            }
            Some(other) => println!("{}", display_field("", other)),
            None => println!("(empty)"),
        },
        other => println!("{}", display_field("", other)),
    }
}
