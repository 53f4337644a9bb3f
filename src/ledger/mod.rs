//! Ledger records, their drafts and patches, and shared record traits.

pub mod budget;
pub mod common;
pub mod goal;
pub mod recurring;
pub mod settings;
pub mod transaction;

pub use budget::{Budget, BudgetCategory, BudgetDraft};
pub use common::{
    most_recent, Identifiable, RecordKind, Selectable, Timestamped, PERCENTAGE_TOLERANCE,
};
pub use goal::{Goal, GoalDraft};
pub use recurring::{
    canonical_recurring_category, ExpenseStatus, Frequency, RecurringExpense,
    RecurringExpenseDraft, RECURRING_CATEGORIES,
};
pub use settings::{Currency, PersonalDetails, Settings, SettingsPatch, Theme};
pub use transaction::{
    canonical_category, Transaction, TransactionDraft, TransactionKind, TransactionPatch,
    OTHER_CATEGORY, TRANSACTION_CATEGORIES,
};
