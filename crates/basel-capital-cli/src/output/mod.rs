pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flat summary of one calculation result, shared by the table and CSV
/// writers. Missing figures (unsupported paths) render as empty cells.
pub(crate) const SUMMARY_COLUMNS: [&str; 11] = [
    "exposure_id",
    "class",
    "requested",
    "effective",
    "status",
    "standardized_rwa",
    "irb_rwa",
    "capital_k",
    "floor_bound",
    "final_rwa",
    "capital_required",
];

pub(crate) fn summary_row(result: &Value) -> Vec<String> {
    let outcome = result.get("outcome");
    let field = |v: Option<&Value>| v.map(format_value).unwrap_or_default();
    let figure = |path: &[&str]| {
        let mut cur = outcome;
        for key in path {
            cur = cur.and_then(|v| v.get(*key));
        }
        field(cur)
    };

    vec![
        field(result.get("exposure_id")),
        field(result.get("exposure_class")),
        field(result.get("requested_approach")),
        field(result.get("effective_approach").filter(|v| !v.is_null())),
        figure(&["status"]),
        figure(&["standardized", "rwa"]),
        figure(&["irb", "rwa"]),
        figure(&["irb", "capital_k"]),
        figure(&["output_floor", "floor_bound"]),
        figure(&["final_rwa"]),
        figure(&["capital_required"]),
    ]
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
