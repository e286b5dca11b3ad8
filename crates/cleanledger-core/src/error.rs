//! Error types for cleanledger-core
//!
//! Validation failures, persistence failures and misuse of the update
//! workflow all surface as [`CoreError`], which carries an error code,
//! a severity and user-facing suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::FieldErrors;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form failed validation
    ValidationError,
    /// Remote store rejected or could not be reached
    PersistenceError,
    /// Remote store refused the credentials
    Unauthorized,
    /// A submission is already running for this form
    SubmissionInProgress,
    /// Transaction not found
    TransactionNotFound,
    /// Transaction violates the debit/credit invariants
    InvalidTransaction,
    /// Option is not offered by a picker
    UnknownOption,
    /// Sanitization rule without keywords
    EmptyKeywords,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::PersistenceError => write!(f, "PERSISTENCE_ERROR"),
            ErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            ErrorCode::SubmissionInProgress => write!(f, "SUBMISSION_IN_PROGRESS"),
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::InvalidTransaction => write!(f, "INVALID_TRANSACTION"),
            ErrorCode::UnknownOption => write!(f, "UNKNOWN_OPTION"),
            ErrorCode::EmptyKeywords => write!(f, "EMPTY_KEYWORDS"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for display
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
    /// Informational
    Info,
    /// Warning - the user can fix it and try again
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - the application is misconfigured
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for cleanledger-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {errors}")]
    Validation { errors: FieldErrors },

    #[error("Failed to {operation}: {message}")]
    Persistence { operation: String, message: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("A submission is already in progress")]
    SubmissionInProgress,

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Invalid transaction: {message}")]
    InvalidTransaction { message: String },

    #[error("Unknown option: {value}")]
    UnknownOption { value: String },

    #[error("A sanitization rule needs at least one keyword")]
    EmptyKeywords,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Shorthand for a persistence failure
    pub fn persistence(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Persistence {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Persistence { .. } => ErrorCode::PersistenceError,
            CoreError::Unauthorized => ErrorCode::Unauthorized,
            CoreError::SubmissionInProgress => ErrorCode::SubmissionInProgress,
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::InvalidTransaction { .. } => ErrorCode::InvalidTransaction,
            CoreError::UnknownOption { .. } => ErrorCode::UnknownOption,
            CoreError::EmptyKeywords => ErrorCode::EmptyKeywords,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Validation { .. } => ErrorSeverity::Warning,
            CoreError::Persistence { .. } => ErrorSeverity::Error,
            CoreError::Unauthorized => ErrorSeverity::Error,
            CoreError::SubmissionInProgress => ErrorSeverity::Info,
            CoreError::TransactionNotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidTransaction { .. } => ErrorSeverity::Error,
            CoreError::UnknownOption { .. } => ErrorSeverity::Warning,
            CoreError::EmptyKeywords => ErrorSeverity::Warning,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the data-fetching layer may transparently retry the call
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Persistence { .. })
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Validation { errors } => {
                details = details.with_detail(serde_json::json!({ "fields": errors }));
                details = details.with_suggestion(
                    "Correct the highlighted fields and submit again.".to_string(),
                );
            }
            CoreError::Persistence { operation, message } => {
                details = details.with_detail(serde_json::json!({
                    "operation": operation,
                    "message": message,
                }));
                details = details.with_suggestion(
                    "Your edits were kept. Submit the form again to retry.".to_string(),
                );
            }
            CoreError::Unauthorized => {
                details = details.with_suggestion(
                    "Sign in again or check the configured API token.".to_string(),
                );
            }
            CoreError::SubmissionInProgress => {
                details = details.with_suggestion(
                    "Wait for the current submission to finish.".to_string(),
                );
            }
            CoreError::TransactionNotFound { .. } => {
                details = details.with_suggestion(
                    "Check the transaction ID and the page it is listed on.".to_string(),
                );
            }
            CoreError::UnknownOption { value } => {
                details = details.with_suggestion(format!(
                    "'{}' is not a known option; pick one from the list.",
                    value
                ));
            }
            CoreError::EmptyKeywords => {
                details = details.with_suggestion(
                    "Add a keyword taken from the raw bank description.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<cleanledger_config::ConfigError> for CoreError {
    fn from(error: cleanledger_config::ConfigError) -> Self {
        CoreError::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Account the operation belongs to
    pub account: Option<String>,
    /// Transaction being edited
    pub transaction_id: Option<String>,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            account: None,
            transaction_id: None,
            data: serde_json::json!({}),
        }
    }

    pub fn with_account(mut self, account: &str) -> Self {
        self.account = Some(account.to_string());
        self
    }

    pub fn with_transaction(mut self, transaction_id: &str) -> Self {
        self.transaction_id = Some(transaction_id.to_string());
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "cleanledger::error",
            "ERROR [{}] {} - Operation: {} - Account: {:?} - Transaction: {:?}",
            error.code(),
            error,
            context.operation,
            context.account,
            context.transaction_id
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "cleanledger::error",
            "WARNING: {} - Operation: {} - Account: {:?} - Transaction: {:?}",
            message,
            context.operation,
            context.account,
            context.transaction_id
        );
    }
}

// ==================== Tests ====================
