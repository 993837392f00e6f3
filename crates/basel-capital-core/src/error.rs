use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapitalError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Parameter resolution failed for {jurisdiction}/{version}: {reason}")]
    ParameterResolution {
        jurisdiction: String,
        version: String,
        reason: String,
    },

    #[error("Invalid parameter set {key}: {reason}")]
    InvalidParameterSet { key: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CapitalError {
    pub(crate) fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CapitalError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CapitalError {
    fn from(e: serde_json::Error) -> Self {
        CapitalError::SerializationError(e.to_string())
    }
}
