//! Error types for apbd-wire

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Malformed payload: {message}")]
    Malformed { message: String },

    #[error("Invalid amount for transaction {transaction_id}: {value}")]
    InvalidAmount { transaction_id: i64, value: String },

    #[error("Backend reported failure: {message}")]
    Unsuccessful { message: String },

    #[error("Payload has no {field} list")]
    MissingData { field: &'static str },
}

impl From<serde_json::Error> for WireError {
    fn from(error: serde_json::Error) -> Self {
        WireError::Malformed {
            message: error.to_string(),
        }
    }
}

/// Result type with WireError
pub type WireResult<T> = Result<T, WireError>;
