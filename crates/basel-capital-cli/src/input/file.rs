use basel_capital_core::ParameterSet;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a JSON file as a generic serde_json::Value.
pub fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// A parameter file holds either one set or a list of sets.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterFile {
    Many(Vec<ParameterSet>),
    One(Box<ParameterSet>),
}

/// Read collaborator-supplied parameter sets from a `.yaml`/`.yml` or JSON
/// file. Validation happens when the sets are registered.
pub fn read_parameter_sets(path: &str) -> Result<Vec<ParameterSet>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let is_yaml = canonical
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let file: ParameterFile = if is_yaml {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    };

    let sets = match file {
        ParameterFile::Many(sets) => sets,
        ParameterFile::One(set) => vec![*set],
    };
    tracing::debug!(path = %canonical.display(), count = sets.len(), "loaded parameter sets");
    Ok(sets)
}

/// Read every `--parameters` file in order.
pub fn read_all_parameter_sets(
    paths: &[String],
) -> Result<Vec<ParameterSet>, Box<dyn std::error::Error>> {
    let mut sets = Vec::new();
    for path in paths {
        sets.extend(read_parameter_sets(path)?);
    }
    Ok(sets)
}

/// Resolve and validate the path, preventing directory traversal.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
