//! Search, filter and sort helpers for list views.

use std::cmp::Reverse;

use crate::ledger::{Frequency, RecurringExpense, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSort {
    /// Newest `date` first.
    #[default]
    Date,
    /// Largest absolute amount first.
    Amount,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub sort: TransactionSort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurringSort {
    #[default]
    NextDueDate,
    Amount,
    Name,
}

#[derive(Debug, Clone, Default)]
pub struct RecurringQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub frequency: Option<Frequency>,
    pub sort: RecurringSort,
}

pub struct FilterService;

impl FilterService {
    /// Matches the search term against description or category, case-insensitively.
    /// Zero amounts count as income for the type filter.
    pub fn transactions<'a>(
        transactions: &'a [Transaction],
        query: &TransactionQuery,
    ) -> Vec<&'a Transaction> {
        let needle = normalized(query.search.as_deref());
        let mut matches: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| {
                needle.as_deref().map_or(true, |needle| {
                    txn.description.to_lowercase().contains(needle)
                        || txn.category.to_lowercase().contains(needle)
                })
            })
            .filter(|txn| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |category| txn.category == category)
            })
            .filter(|txn| match query.kind {
                Some(TransactionKind::Income) => !txn.is_expense(),
                Some(TransactionKind::Expense) => txn.is_expense(),
                None => true,
            })
            .collect();

        match query.sort {
            TransactionSort::Date => matches.sort_by_key(|txn| Reverse(txn.date)),
            TransactionSort::Amount => matches.sort_by_key(|txn| Reverse(txn.amount.abs())),
        }
        matches
    }

    pub fn recurring<'a>(
        expenses: &'a [RecurringExpense],
        query: &RecurringQuery,
    ) -> Vec<&'a RecurringExpense> {
        let needle = normalized(query.search.as_deref());
        let mut matches: Vec<&RecurringExpense> = expenses
            .iter()
            .filter(|expense| {
                needle
                    .as_deref()
                    .map_or(true, |needle| expense.name.to_lowercase().contains(needle))
            })
            .filter(|expense| {
                query
                    .category
                    .as_deref()
                    .map_or(true, |category| expense.category == category)
            })
            .filter(|expense| query.frequency.map_or(true, |freq| expense.frequency == freq))
            .collect();

        match query.sort {
            RecurringSort::NextDueDate => matches.sort_by_key(|expense| expense.next_due_date),
            RecurringSort::Amount => matches.sort_by_key(|expense| Reverse(expense.amount)),
            RecurringSort::Name => {
                matches.sort_by_key(|expense| expense.name.to_lowercase());
            }
        }
        matches
    }

    /// Distinct categories present in `transactions`, in first-seen order.
    pub fn used_categories(transactions: &[Transaction]) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for txn in transactions {
            if !txn.category.is_empty() && !seen.contains(&txn.category.as_str()) {
                seen.push(&txn.category);
            }
        }
        seen
    }
}

fn normalized(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{RecurringExpenseDraft, TransactionDraft};
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn txn(description: &str, category: &str, amount: i64, day: u32) -> Transaction {
        let date = Utc.with_ymd_and_hms(2025, 5, day, 8, 0, 0).unwrap();
        Transaction::from_draft(
            TransactionDraft {
                description: description.into(),
                category: category.into(),
                amount: Decimal::from(amount),
                date: Some(date),
            },
            date,
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("Groceries", "Food & Dining", -80, 3),
            txn("Paycheck", "Income", 2500, 1),
            txn("Train pass", "Transportation", -120, 5),
            txn("Dinner out", "Food & Dining", -45, 7),
        ]
    }

    #[test]
    fn searches_description_and_category() {
        let transactions = sample();
        let query = TransactionQuery {
            search: Some("FOOD".into()),
            ..Default::default()
        };
        let found = FilterService::transactions(&transactions, &query);
        let names: Vec<_> = found.iter().map(|txn| txn.description.as_str()).collect();
        assert_eq!(names, vec!["Dinner out", "Groceries"]);
    }

    #[test]
    fn filters_by_kind_and_sorts_by_amount() {
        let transactions = sample();
        let query = TransactionQuery {
            kind: Some(TransactionKind::Expense),
            sort: TransactionSort::Amount,
            ..Default::default()
        };
        let found = FilterService::transactions(&transactions, &query);
        let amounts: Vec<_> = found.iter().map(|txn| txn.amount).collect();
        assert_eq!(
            amounts,
            vec![Decimal::from(-120), Decimal::from(-80), Decimal::from(-45)]
        );
    }

    #[test]
    fn lists_used_categories_once() {
        let transactions = sample();
        assert_eq!(
            FilterService::used_categories(&transactions),
            vec!["Food & Dining", "Income", "Transportation"]
        );
    }

    #[test]
    fn recurring_filters_by_frequency_and_sorts_by_name() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let make = |name: &str, frequency: Frequency| {
            RecurringExpense::from_draft(
                RecurringExpenseDraft {
                    name: name.into(),
                    category: "Utilities".into(),
                    amount: Decimal::from(30),
                    frequency,
                    next_due_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
                },
                created,
            )
        };
        let expenses = vec![
            make("water", Frequency::Monthly),
            make("Internet", Frequency::Monthly),
            make("Insurance", Frequency::Yearly),
        ];
        let query = RecurringQuery {
            frequency: Some(Frequency::Monthly),
            sort: RecurringSort::Name,
            ..Default::default()
        };
        let names: Vec<_> = FilterService::recurring(&expenses, &query)
            .iter()
            .map(|expense| expense.name.as_str())
            .collect();
        assert_eq!(names, vec!["Internet", "water"]);
    }
}
