use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Supervisory jurisdiction whose parameter tables govern a calculation.
///
/// Serialized as its code (`"CAN"`), parsed with [`Jurisdiction::from_code`].
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Jurisdiction {
    /// Basel Committee baseline text
    #[default]
    BCBS,
    US,
    CAN,
    EU,
    Other(String),
}

impl Jurisdiction {
    /// Parse a jurisdiction code case-insensitively; unknown codes are kept
    /// verbatim (upper-cased) so that resolution can fail with the real code.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "BCBS" | "BASEL" => Jurisdiction::BCBS,
            "US" | "USA" => Jurisdiction::US,
            "CAN" | "CA" | "CANADA" => Jurisdiction::CAN,
            "EU" => Jurisdiction::EU,
            other => Jurisdiction::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Jurisdiction::BCBS => "BCBS",
            Jurisdiction::US => "US",
            Jurisdiction::CAN => "CAN",
            Jurisdiction::EU => "EU",
            Jurisdiction::Other(code) => code.as_str(),
        }
    }
}

impl From<String> for Jurisdiction {
    fn from(code: String) -> Self {
        Jurisdiction::from_code(&code)
    }
}

impl From<Jurisdiction> for String {
    fn from(j: Jurisdiction) -> Self {
        j.code().to_string()
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jurisdiction_codes_and_aliases() {
        assert_eq!(Jurisdiction::from_code(" canada "), Jurisdiction::CAN);
        assert_eq!(Jurisdiction::from_code("usa"), Jurisdiction::US);
        assert_eq!(
            Jurisdiction::from_code("jp"),
            Jurisdiction::Other("JP".into())
        );
    }

    #[test]
    fn test_jurisdiction_serializes_as_code() {
        let json = serde_json::to_string(&Jurisdiction::CAN).unwrap();
        assert_eq!(json, "\"CAN\"");
        let back: Jurisdiction = serde_json::from_str("\"eu\"").unwrap();
        assert_eq!(back, Jurisdiction::EU);
    }
}
