use thiserror::Error;
use uuid::Uuid;

use crate::ledger::RecordKind;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: Uuid },
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(kind: RecordKind, id: Uuid) -> Self {
        LedgerError::NotFound { kind, id }
    }

    /// Returns `true` when the error came from the storage provider.
    pub fn is_persistence(&self) -> bool {
        matches!(self, LedgerError::Persistence(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Persistence(err.to_string())
    }
}

/// Rejections raised while turning raw form input into records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` is required")]
    MissingField(&'static str),
    #[error("`{field}` is not a valid number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("amount must not be zero")]
    ZeroAmount,
    #[error("`{0}` must be greater than zero")]
    NotPositive(&'static str),
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
    #[error("`{value}` is not a valid date for `{field}`")]
    InvalidDate { field: &'static str, value: String },
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("a budget needs at least one category")]
    NoCategories,
    #[error("category names must not be empty")]
    EmptyCategoryName,
    #[error("duplicate category `{0}`")]
    DuplicateCategory(String),
    #[error("percentage for `{name}` must be between 0 and 100, got {value}")]
    PercentageOutOfRange { name: String, value: String },
    #[error("category percentages must add up to 100%, got {0}%")]
    PercentageTotal(String),
    #[error("unknown frequency `{0}` (use weekly, monthly or yearly)")]
    UnknownFrequency(String),
    #[error("unknown theme `{0}` (use light or dark)")]
    UnknownTheme(String),
    #[error("unsupported currency `{0}`")]
    UnsupportedCurrency(String),
    #[error("unknown status `{0}` (use active or inactive)")]
    UnknownStatus(String),
    #[error("unknown transaction type `{0}` (use income or expense)")]
    UnknownKind(String),
}
