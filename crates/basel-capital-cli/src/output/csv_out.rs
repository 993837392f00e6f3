use serde_json::Value;
use std::io;

use super::{format_value, summary_row, SUMMARY_COLUMNS};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout: one summary row per calculation result,
/// or one row per object for plain lists such as parameter summaries.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result");
    match (result, value) {
        (Some(result), _) if result.get("outcome").is_some() => {
            let _ = wtr.write_record(SUMMARY_COLUMNS);
            let _ = wtr.write_record(summary_row(result));
        }
        (Some(result), _) if result.get("results").is_some() => {
            let _ = wtr.write_record(SUMMARY_COLUMNS);
            if let Some(Value::Array(results)) = result.get("results") {
                for r in results {
                    let _ = wtr.write_record(summary_row(r));
                }
            }
        }
        (_, Value::Array(arr)) => write_array_csv(&mut wtr, arr),
        (_, Value::Object(map)) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), &format_value(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
