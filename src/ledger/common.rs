//! Shared traits and enums for ledger records.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Tolerance applied when checking that budget percentages add up to 100.
pub const PERCENTAGE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Exposes a stable identifier for records stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Records that carry a creation timestamp.
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
}

/// Records of which at most one per collection is the "current" selection.
pub trait Selectable: Identifiable + Timestamped {
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

/// Names the collection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Transaction,
    Budget,
    RecurringExpense,
    Goal,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Transaction,
        RecordKind::Budget,
        RecordKind::RecurringExpense,
        RecordKind::Goal,
    ];

    /// Storage key of the collection, matching the document store naming.
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Transaction => "transactions",
            RecordKind::Budget => "budgets",
            RecordKind::RecurringExpense => "recurringExpenses",
            RecordKind::Goal => "goals",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Transaction => "Transaction",
            RecordKind::Budget => "Budget",
            RecordKind::RecurringExpense => "Recurring expense",
            RecordKind::Goal => "Goal",
        };
        f.write_str(label)
    }
}

/// Picks the most recently created record; ties keep collection order.
pub fn most_recent<T: Timestamped>(records: &[T]) -> Option<&T> {
    records.iter().reduce(|best, candidate| {
        if candidate.created_at() > best.created_at() {
            candidate
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_is_one_tenth() {
        assert_eq!(PERCENTAGE_TOLERANCE, Decimal::new(1, 1));
    }

    #[test]
    fn collection_names_match_document_store() {
        let names: Vec<_> = RecordKind::ALL.iter().map(|k| k.collection()).collect();
        assert_eq!(
            names,
            vec!["transactions", "budgets", "recurringExpenses", "goals"]
        );
    }
}
