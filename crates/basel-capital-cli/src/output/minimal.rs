use serde_json::Value;

use super::format_value;

/// Print just the headline number: final RWA for a single exposure, total
/// final RWA for a portfolio, or the reason an exposure was not computed.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let candidates = [
        result.pointer("/outcome/final_rwa"),
        result.pointer("/totals/total_final_rwa"),
        result.pointer("/outcome/reason"),
    ];
    if let Some(val) = candidates.into_iter().flatten().find(|v| !v.is_null()) {
        println!("{}", format_value(val));
        return;
    }

    if let Value::Object(map) = result {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result));
}
