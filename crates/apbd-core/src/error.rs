//! Error types for apbd-core
//!
//! Only contract violations are errors here. Missing or malformed category
//! references degrade into promoted roots and never surface as `CoreError`.

use apbd_wire::WireError;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::types::BudgetKind;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input violates the data contract
    ValidationError,
    /// Upstream payload could not be decoded
    InvalidPayload,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidPayload => write!(f, "INVALID_PAYLOAD"),
        }
    }
}

/// Detailed error information for callers that render messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Operation refused, input can be corrected
    Warning,
    /// Operation failed
    Error,
}

impl ErrorSeverity {
    /// Level used when the error is written to the log
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for apbd-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid payload: {0}")]
    Wire(#[from] WireError),
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Wire(_) => ErrorCode::InvalidPayload,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::Wire(_) => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "Check amounts are non-negative and levels are 1, 2 or 3.".to_string()
                );
                details = details.with_suggestion(format!(
                    "Budget kind must be one of: {}.",
                    BudgetKind::ALL.map(|k| k.as_str()).join(", ")
                ));
            }
            CoreError::Wire(WireError::Unsuccessful { .. }) => {
                details = details.with_suggestion(
                    "The backend refused the request; gagal memuat data.".to_string()
                );
            }
            CoreError::Wire(_) => {
                details = details.with_suggestion(
                    "Export the data again from /api/transaksi-apbd and /api/kategori-apbd."
                        .to_string(),
                );
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Budget kind being aggregated
    pub kind: Option<BudgetKind>,
    /// Fiscal year being aggregated
    pub fiscal_year: Option<i32>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            operation,
            kind: None,
            fiscal_year: None,
        }
    }

    pub fn with_kind(mut self, kind: BudgetKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_fiscal_year(mut self, fiscal_year: Option<i32>) -> Self {
        self.fiscal_year = fiscal_year;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::log!(
            target: "apbd::error",
            error.severity().log_level(),
            "{} [{}] {} - Operation: {} - Kind: {:?} - Year: {:?}",
            error.severity().to_string().to_uppercase(),
            error.code(),
            error.to_details(),
            context.operation,
            context.kind,
            context.fiscal_year
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "apbd::error",
            "WARNING: {} - Operation: {} - Kind: {:?} - Year: {:?}",
            message,
            context.operation,
            context.kind,
            context.fiscal_year
        );
    }
}

// ==================== Tests ====================
