use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum BillSplitError {
    /// An item has no sharers, a weight is not positive, or an index is out of range
    #[error("Invalid assignment: {0}")]
    InvalidAssignment(String),

    /// Bill totals do not reconcile within the configured tolerance
    #[error("Inconsistent bill: expected {expected}, got {actual}")]
    InconsistentBill { expected: Decimal, actual: Decimal },

    #[error("Invalid payment recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The AI provider returned something that cannot be mapped into a bill or matches
    #[error("Could not parse upstream response: {0}")]
    UpstreamParseError(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    #[error("No saved recipient for user {0}")]
    RecipientNotFound(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),
}

impl BillSplitError {
    pub(crate) fn invalid_input(field: &str, title: &str, description: impl Into<String>) -> Self {
        BillSplitError::InvalidInput(
            field.to_string(),
            FieldError {
                field: field.to_string(),
                title: title.to_string(),
                description: description.into(),
            },
        )
    }
}
