use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, Timestamped};
use crate::errors::ValidationError;

/// Categories offered for bills and subscriptions.
pub const RECURRING_CATEGORIES: [&str; 6] = [
    "Entertainment",
    "Housing",
    "Utilities",
    "Health & Fitness",
    "Transportation",
    "Other",
];

pub fn canonical_recurring_category(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    RECURRING_CATEGORIES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(needle))
}

/// A bill or subscription that repeats on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
}

impl RecurringExpense {
    /// New expenses always start active.
    pub fn from_draft(draft: RecurringExpenseDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            category: draft.category,
            amount: draft.amount,
            frequency: draft.frequency,
            next_due_date: draft.next_due_date,
            status: ExpenseStatus::Active,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpenseStatus::Active
    }

    /// Amount this expense costs over a year.
    pub fn annualized(&self) -> Decimal {
        self.amount
            .saturating_mul(Decimal::from(self.frequency.occurrences_per_year()))
    }
}

impl Identifiable for RecurringExpense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Timestamped for RecurringExpense {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringExpenseDraft {
    pub name: String,
    pub category: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
}

impl RecurringExpenseDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("amount"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Weekly, Frequency::Monthly, Frequency::Yearly];

    pub fn occurrences_per_year(self) -> u32 {
        match self {
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Yearly => 1,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "weekly" => Some(Frequency::Weekly),
            "monthly" => Some(Frequency::Monthly),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    #[default]
    Active,
    Inactive,
}

impl ExpenseStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ExpenseStatus::Active),
            "inactive" => Some(ExpenseStatus::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseStatus::Active => f.write_str("active"),
            ExpenseStatus::Inactive => f.write_str("inactive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annualizes_by_frequency() {
        let draft = RecurringExpenseDraft {
            name: "Gym".into(),
            category: "Health & Fitness".into(),
            amount: Decimal::new(10, 0),
            frequency: Frequency::Weekly,
            next_due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        };
        let expense = RecurringExpense::from_draft(draft, Utc::now());
        assert!(expense.is_active());
        assert_eq!(expense.annualized(), Decimal::new(520, 0));
    }

    #[test]
    fn frequency_round_trips_lowercase() {
        let json = serde_json::to_string(&Frequency::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
        assert_eq!(Frequency::parse("Monthly"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse("daily"), None);
    }
}
