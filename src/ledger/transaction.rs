use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, Timestamped};
use crate::errors::ValidationError;

/// Category used when nothing more specific applies.
pub const OTHER_CATEGORY: &str = "Other";

/// Fixed set of categories a transaction may carry.
pub const TRANSACTION_CATEGORIES: [&str; 10] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Bills & Utilities",
    "Healthcare",
    "Education",
    "Travel",
    "Income",
    OTHER_CATEGORY,
];

/// Looks up the canonical spelling of a transaction category, ignoring case.
pub fn canonical_category(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    TRANSACTION_CATEGORIES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(needle))
}

/// A single income or expense entry. Negative amounts are expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn from_draft(draft: TransactionDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: draft.description,
            category: draft.category,
            amount: draft.amount,
            date: draft.date.unwrap_or(created_at),
            created_at,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn kind(&self) -> TransactionKind {
        if self.is_expense() {
            TransactionKind::Expense
        } else {
            TransactionKind::Income
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Timestamped for Transaction {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated input for a new transaction. `date` falls back to the creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.amount.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }
        ensure_known_category(&self.category)
    }
}

fn ensure_known_category(category: &str) -> Result<(), ValidationError> {
    match canonical_category(category) {
        Some(known) if known == category => Ok(()),
        _ => Err(ValidationError::UnknownCategory(category.to_string())),
    }
}

/// Direction of a transaction as entered on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    /// Applies the sign convention: expenses are stored negative, income positive.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Expense => -amount.abs(),
            TransactionKind::Income => amount.abs(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expense" => Some(TransactionKind::Expense),
            "income" => Some(TransactionKind::Income),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Expense => f.write_str("expense"),
            TransactionKind::Income => f.write_str("income"),
        }
    }
}

/// Partial update for an existing transaction; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    pub fn apply(&self, transaction: &mut Transaction) {
        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }
        if let Some(category) = &self.category {
            transaction.category = category.clone();
        }
        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }
        if let Some(date) = self.date {
            transaction.date = date;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(ValidationError::MissingField("description"));
            }
        }
        if self.amount.is_some_and(|amount| amount.is_zero()) {
            return Err(ValidationError::ZeroAmount);
        }
        match &self.category {
            Some(category) => ensure_known_category(category),
            None => Ok(()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expense_kind_negates_amount() {
        let amount = Decimal::new(450, 2);
        assert_eq!(TransactionKind::Expense.signed(amount), Decimal::new(-450, 2));
        assert_eq!(TransactionKind::Income.signed(-amount), amount);
    }

    #[test]
    fn canonical_category_ignores_case() {
        assert_eq!(canonical_category("food & dining"), Some("Food & Dining"));
        assert_eq!(canonical_category("  other "), Some(OTHER_CATEGORY));
        assert_eq!(canonical_category("Groceries"), None);
    }

    #[test]
    fn draft_without_date_uses_creation_time() {
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let txn = Transaction::from_draft(
            TransactionDraft {
                description: "Coffee".into(),
                category: "Food & Dining".into(),
                amount: Decimal::new(-450, 2),
                date: None,
            },
            created,
        );
        assert_eq!(txn.date, created);
        assert!(txn.is_expense());
        assert_eq!(txn.kind(), TransactionKind::Expense);
    }

    #[test]
    fn draft_validation_rejects_zero_and_unknown_category() {
        let mut draft = TransactionDraft {
            description: "Lunch".into(),
            category: "Food & Dining".into(),
            amount: Decimal::ZERO,
            date: None,
        };
        assert_eq!(draft.validate(), Err(ValidationError::ZeroAmount));
        draft.amount = Decimal::new(-12, 0);
        assert!(draft.validate().is_ok());
        draft.category = "food & dining".into();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let txn = Transaction::from_draft(
            TransactionDraft {
                description: "Salary".into(),
                category: "Income".into(),
                amount: Decimal::new(3000, 0),
                date: Some(created),
            },
            created,
        );
        let json = serde_json::to_value(&txn).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
