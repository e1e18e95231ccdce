use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayoffError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PayoffError {
    fn from(e: serde_json::Error) -> Self {
        PayoffError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for PayoffError {
    fn from(e: csv::Error) -> Self {
        PayoffError::ExportError(e.to_string())
    }
}

impl From<std::io::Error> for PayoffError {
    fn from(e: std::io::Error) -> Self {
        PayoffError::ExportError(e.to_string())
    }
}
