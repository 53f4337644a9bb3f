//! Derived figures for dashboards: balances, monthly totals, budget status,
//! upcoming bills and goal projections.
//!
//! Everything here is a pure function over borrowed collections. Nothing is
//! cached; callers recompute on every read.

use std::cmp::Reverse;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{Budget, Frequency, Goal, RecurringExpense, Transaction};

/// Days ahead of today that count as "upcoming" for recurring bills.
pub const UPCOMING_WINDOW_DAYS: i64 = 30;
/// Maximum number of bills returned by [`SummaryService::upcoming_bills`].
pub const UPCOMING_LIMIT: usize = 5;
/// Maximum number of entries returned by [`SummaryService::recent_transactions`].
pub const RECENT_LIMIT: usize = 5;

/// Share of a category budget above which spending is flagged as a warning.
const WARNING_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Inclusive calendar-month window in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    /// Window for the calendar month containing `instant`.
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let (year, month) = (instant.year(), instant.month());
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let start = first_instant(year, month).unwrap_or(instant);
        let end = first_instant(next_year, next_month)
            .map(|next| next - Duration::nanoseconds(1))
            .unwrap_or(instant);
        Self { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

fn first_instant(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

/// Which transactions count toward a budget category's spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpendingScope {
    /// Every expense ever recorded in the category, ignoring the budget month.
    #[default]
    AllTime,
    /// Only expenses dated within the budget's calendar month.
    BudgetMonth,
}

impl SpendingScope {
    fn includes(self, budget: &Budget, transaction: &Transaction) -> bool {
        match self {
            SpendingScope::AllTime => true,
            SpendingScope::BudgetMonth => MonthWindow::containing(budget.month).contains(transaction.date),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Good,
    Warning,
    Over,
}

impl BudgetStatus {
    pub fn classify(spent: Decimal, budgeted: Decimal) -> Self {
        if spent > budgeted {
            BudgetStatus::Over
        } else if spent > budgeted.saturating_mul(WARNING_RATIO) {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Good
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub name: String,
    pub percentage: Decimal,
    pub budgeted: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    pub budget_id: Option<Uuid>,
    pub categories: Vec<CategoryProgress>,
    pub total_spent: Decimal,
    pub total_budget: Decimal,
    pub overall_progress: Decimal,
}

/// Projection of how long a goal needs at the current monthly net.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeToGoal {
    Reached,
    Months(u32),
    NotComputable,
}

impl TimeToGoal {
    pub fn label(&self) -> String {
        match *self {
            TimeToGoal::Reached => "Reached".to_string(),
            TimeToGoal::NotComputable => "N/A (negative balance)".to_string(),
            TimeToGoal::Months(months) if months < 12 => plural(months, "month"),
            TimeToGoal::Months(months) => {
                let years = plural(months / 12, "year");
                match months % 12 {
                    0 => years,
                    rest => format!("{years} {}", plural(rest, "month")),
                }
            }
        }
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTotals {
    pub total_monthly: Decimal,
    pub total_yearly: Decimal,
    pub active_count: usize,
}

/// Adds amounts, pinning at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.
fn total(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `part / whole` as a percentage in `[0, 100]`. `whole` must be positive;
/// a ratio too large to represent counts as 100.
fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or_else(
            || {
                if part.is_sign_negative() {
                    Decimal::ZERO
                } else {
                    Decimal::ONE_HUNDRED
                }
            },
            |percent| percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED),
        )
}

pub struct SummaryService;

impl SummaryService {
    /// Sum of every transaction amount, across all history.
    pub fn total_balance(transactions: &[Transaction]) -> Decimal {
        total(transactions.iter().map(|txn| txn.amount))
    }

    pub fn total_income(transactions: &[Transaction], now: DateTime<Utc>) -> Decimal {
        let window = MonthWindow::containing(now);
        total(
            transactions
                .iter()
                .filter(|txn| txn.is_income() && window.contains(txn.date))
                .map(|txn| txn.amount),
        )
    }

    /// Absolute value of this month's expenses.
    pub fn total_expenses(transactions: &[Transaction], now: DateTime<Utc>) -> Decimal {
        let window = MonthWindow::containing(now);
        total(
            transactions
                .iter()
                .filter(|txn| txn.is_expense() && window.contains(txn.date))
                .map(|txn| txn.amount),
        )
        .abs()
    }

    pub fn monthly_net_balance(transactions: &[Transaction], now: DateTime<Utc>) -> Decimal {
        Self::total_income(transactions, now) - Self::total_expenses(transactions, now)
    }

    /// Active bills due within the next [`UPCOMING_WINDOW_DAYS`] days, soonest first.
    pub fn upcoming_bills(expenses: &[RecurringExpense], today: NaiveDate) -> Vec<&RecurringExpense> {
        let mut due: Vec<&RecurringExpense> = expenses
            .iter()
            .filter(|expense| expense.is_active())
            .filter(|expense| {
                let days = (expense.next_due_date - today).num_days();
                (0..=UPCOMING_WINDOW_DAYS).contains(&days)
            })
            .collect();
        due.sort_by_key(|expense| expense.next_due_date);
        due.truncate(UPCOMING_LIMIT);
        due
    }

    pub fn recent_transactions(transactions: &[Transaction]) -> Vec<&Transaction> {
        let mut recent: Vec<&Transaction> = transactions.iter().collect();
        recent.sort_by_key(|txn| Reverse(txn.created_at));
        recent.truncate(RECENT_LIMIT);
        recent
    }

    /// Absolute spend recorded against `category`. With [`SpendingScope::AllTime`]
    /// the budget's month is ignored.
    pub fn budget_category_spending(
        transactions: &[Transaction],
        budget: &Budget,
        category: &str,
        scope: SpendingScope,
    ) -> Decimal {
        total(
            transactions
                .iter()
                .filter(|txn| txn.is_expense() && txn.category == category)
                .filter(|txn| scope.includes(budget, txn))
                .map(|txn| txn.amount.abs()),
        )
    }

    /// Spend-versus-plan breakdown. A missing budget or one without
    /// categories yields a zeroed result.
    pub fn budget_progress(
        budget: Option<&Budget>,
        transactions: &[Transaction],
        scope: SpendingScope,
    ) -> BudgetProgress {
        let Some(budget) = budget else {
            return BudgetProgress::default();
        };
        if budget.categories.is_empty() {
            return BudgetProgress {
                budget_id: Some(budget.id),
                ..BudgetProgress::default()
            };
        }

        let categories: Vec<CategoryProgress> = budget
            .categories
            .iter()
            .map(|category| {
                let budgeted = category.budgeted(budget.limit);
                let spent =
                    Self::budget_category_spending(transactions, budget, &category.name, scope);
                CategoryProgress {
                    name: category.name.clone(),
                    percentage: category.percentage,
                    budgeted,
                    spent,
                    remaining: (budgeted - spent).max(Decimal::ZERO),
                    status: BudgetStatus::classify(spent, budgeted),
                }
            })
            .collect();
        let total_spent = total(categories.iter().map(|category| category.spent));
        let overall_progress = if budget.limit > Decimal::ZERO {
            percentage_of(total_spent, budget.limit)
        } else {
            Decimal::ZERO
        };

        BudgetProgress {
            budget_id: Some(budget.id),
            categories,
            total_spent,
            total_budget: budget.limit,
            overall_progress,
        }
    }

    /// Completion percentage in `[0, 100]`.
    pub fn goal_progress(goal: &Goal) -> Decimal {
        if goal.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        percentage_of(goal.current_amount, goal.target_amount)
    }

    /// Whole months needed at `monthly_net`, rounded up. A month count that
    /// does not fit is reported as [`TimeToGoal::NotComputable`].
    pub fn time_to_goal(goal: &Goal, monthly_net: Decimal) -> TimeToGoal {
        let remaining = goal.remaining();
        if remaining.is_zero() {
            return TimeToGoal::Reached;
        }
        if monthly_net <= Decimal::ZERO {
            return TimeToGoal::NotComputable;
        }
        remaining
            .checked_div(monthly_net)
            .map(|months| months.round_dp_with_strategy(0, RoundingStrategy::ToPositiveInfinity))
            .and_then(|months| months.to_u32())
            .map_or(TimeToGoal::NotComputable, TimeToGoal::Months)
    }

    pub fn recurring_totals(expenses: &[RecurringExpense]) -> RecurringTotals {
        RecurringTotals {
            total_monthly: total(
                expenses
                    .iter()
                    .filter(|expense| expense.frequency == Frequency::Monthly)
                    .map(|expense| expense.amount),
            ),
            total_yearly: total(expenses.iter().map(RecurringExpense::annualized)),
            active_count: expenses.iter().filter(|expense| expense.is_active()).count(),
        }
    }
}
