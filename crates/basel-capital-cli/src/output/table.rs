use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, summary_row, SUMMARY_COLUMNS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) if result.get("outcome").is_some() => {
                print_calculation(result);
                print_envelope_notes(map);
            }
            Some(result) if result.get("results").is_some() => {
                print_portfolio(result);
                print_envelope_notes(map);
            }
            _ => print_flat_object(map),
        },
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_calculation(result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (column, cell) in SUMMARY_COLUMNS.iter().zip(summary_row(result)) {
        if !cell.is_empty() {
            builder.push_record([column.to_string(), cell]);
        }
    }
    if let Some(Value::String(reason)) = result.pointer("/outcome/reason") {
        builder.push_record(["reason".to_string(), reason.clone()]);
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Array(overrides)) = result.pointer("/outcome/overrides") {
        if !overrides.is_empty() {
            println!("\nOverrides:");
            print_array_table(overrides);
        }
    }

    if let Some(Value::Array(entries)) = result.pointer("/audit/entries") {
        println!("\nAudit trail:");
        let mut builder = Builder::default();
        builder.push_record(["Step", "Event", "Detail"]);
        for entry in entries {
            let Value::Object(map) = entry else { continue };
            let detail: Vec<String> = map
                .iter()
                .filter(|(k, _)| *k != "step" && *k != "event")
                .map(|(k, v)| format!("{}={}", k, format_value(v)))
                .collect();
            builder.push_record([
                map.get("step").map(format_value).unwrap_or_default(),
                map.get("event").map(format_value).unwrap_or_default(),
                detail.join("; "),
            ]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_portfolio(result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(SUMMARY_COLUMNS);
    if let Some(Value::Array(results)) = result.get("results") {
        for r in results {
            builder.push_record(summary_row(r));
        }
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Object(totals)) = result.get("totals") {
        println!("\nTotals:");
        print_flat_object(totals);
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
