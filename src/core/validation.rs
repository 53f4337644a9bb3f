//! Turns raw form input into validated drafts before any store mutation runs.
//!
//! Each form mirrors what a UI collects: plain strings, blank meaning "not
//! provided". Parsing either yields a draft the store can apply as-is or the
//! first [`ValidationError`] encountered.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::ledger::budget::validate_categories;
use crate::ledger::{
    canonical_category, canonical_recurring_category, BudgetCategory, BudgetDraft, Currency,
    Frequency, GoalDraft, RecurringExpenseDraft, SettingsPatch, Theme, TransactionDraft,
    TransactionKind, TransactionPatch,
};

type Validated<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub kind: TransactionKind,
    pub date: String,
}

impl TransactionForm {
    pub fn parse(&self) -> Validated<TransactionDraft> {
        let description = required("description", &self.description)?;
        let raw_amount = required("amount", &self.amount)?;
        let category = required("category", &self.category)?;

        let amount = parse_decimal("amount", raw_amount)?;
        if amount.is_zero() {
            return Err(ValidationError::ZeroAmount);
        }
        let category = canonical_category(category)
            .ok_or_else(|| ValidationError::UnknownCategory(category.to_string()))?;

        Ok(TransactionDraft {
            description: description.to_string(),
            category: category.to_string(),
            amount: self.kind.signed(amount),
            date: optional(&self.date)
                .map(|raw| parse_timestamp("date", raw))
                .transpose()?,
        })
    }
}

/// Edit form for an existing transaction. `None` and blank strings leave the
/// field unchanged. When `kind` is set the amount is re-signed accordingly;
/// otherwise the amount is taken with its own sign.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdateForm {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub date: Option<String>,
}

impl TransactionUpdateForm {
    pub fn parse(&self) -> Validated<TransactionPatch> {
        let mut patch = TransactionPatch::default();
        if let Some(description) = provided(&self.description) {
            patch.description = Some(description.to_string());
        }
        if let Some(category) = provided(&self.category) {
            let canonical = canonical_category(category)
                .ok_or_else(|| ValidationError::UnknownCategory(category.to_string()))?;
            patch.category = Some(canonical.to_string());
        }
        match (provided(&self.amount), self.kind) {
            (Some(raw), kind) => {
                let amount = parse_decimal("amount", raw)?;
                if amount.is_zero() {
                    return Err(ValidationError::ZeroAmount);
                }
                patch.amount = Some(kind.map_or(amount, |kind| kind.signed(amount)));
            }
            (None, Some(_)) => return Err(ValidationError::MissingField("amount")),
            (None, None) => {}
        }
        if let Some(date) = provided(&self.date) {
            patch.date = Some(parse_timestamp("date", date)?);
        }
        Ok(patch)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetCategoryForm {
    pub name: String,
    pub percentage: String,
}

impl BudgetCategoryForm {
    pub fn new(name: impl Into<String>, percentage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            percentage: percentage.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub limit: String,
    pub categories: Vec<BudgetCategoryForm>,
    pub month: String,
}

impl BudgetForm {
    pub fn parse(&self) -> Validated<BudgetDraft> {
        let limit = parse_decimal("limit", required("limit", &self.limit)?)?;
        if limit <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("limit"));
        }

        let mut categories = Vec::with_capacity(self.categories.len());
        for row in &self.categories {
            let name = row.name.trim();
            if name.is_empty() {
                return Err(ValidationError::EmptyCategoryName);
            }
            let percentage = parse_decimal("percentage", required("percentage", &row.percentage)?)?;
            categories.push(BudgetCategory::new(name, percentage));
        }
        validate_categories(&categories)?;

        Ok(BudgetDraft {
            limit,
            categories,
            month: optional(&self.month)
                .map(|raw| parse_timestamp("month", raw))
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecurringExpenseForm {
    pub name: String,
    pub category: String,
    pub amount: String,
    pub frequency: String,
    pub next_due_date: String,
}

impl RecurringExpenseForm {
    pub fn parse(&self) -> Validated<RecurringExpenseDraft> {
        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let raw_amount = required("amount", &self.amount)?;
        let raw_due = required("next due date", &self.next_due_date)?;

        let amount = parse_decimal("amount", raw_amount)?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("amount"));
        }
        let category = canonical_recurring_category(category)
            .ok_or_else(|| ValidationError::UnknownCategory(category.to_string()))?;
        // Blank frequency falls back to monthly, the form's preselected value.
        let frequency = match optional(&self.frequency) {
            Some(raw) => {
                Frequency::parse(raw).ok_or_else(|| ValidationError::UnknownFrequency(raw.into()))?
            }
            None => Frequency::default(),
        };

        Ok(RecurringExpenseDraft {
            name: name.to_string(),
            category: category.to_string(),
            amount,
            frequency,
            next_due_date: parse_date("next due date", raw_due)?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoalForm {
    pub name: String,
    pub target_amount: String,
    pub current_amount: String,
    pub deadline: String,
}

impl GoalForm {
    pub fn parse(&self) -> Validated<GoalDraft> {
        let name = required("name", &self.name)?;
        let raw_target = required("target amount", &self.target_amount)?;
        let raw_deadline = required("deadline", &self.deadline)?;

        let target_amount = parse_decimal("target amount", raw_target)?;
        if target_amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("target amount"));
        }
        let current_amount = match optional(&self.current_amount) {
            Some(raw) => parse_non_negative("current amount", raw)?,
            None => Decimal::ZERO,
        };

        Ok(GoalDraft {
            name: name.to_string(),
            target_amount,
            current_amount,
            deadline: parse_date("deadline", raw_deadline)?,
        })
    }
}

/// Parses the saved amount entered on a goal's progress form.
pub fn parse_goal_progress(raw: &str) -> Validated<Decimal> {
    parse_non_negative("current amount", required("current amount", raw)?)
}

#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub theme: Option<String>,
    pub currency: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl SettingsForm {
    pub fn parse(&self) -> Validated<SettingsPatch> {
        let mut patch = SettingsPatch::default();
        if let Some(raw) = provided(&self.theme) {
            patch.theme = Some(Theme::parse(raw).ok_or_else(|| ValidationError::UnknownTheme(raw.into()))?);
        }
        if let Some(raw) = provided(&self.currency) {
            patch.currency = Some(
                Currency::parse(raw).ok_or_else(|| ValidationError::UnsupportedCurrency(raw.into()))?,
            );
        }
        patch.first_name = self.first_name.as_deref().map(|value| value.trim().to_string());
        patch.last_name = self.last_name.as_deref().map(|value| value.trim().to_string());
        if let Some(email) = &self.email {
            patch.email = Some(required("email", email)?.to_string());
        }
        Ok(patch)
    }
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(field: &'static str, raw: &str) -> Validated<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only its date.
pub fn parse_date(field: &'static str, raw: &str) -> Validated<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|parsed| parsed.with_timezone(&Utc).date_naive())
        })
        .ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: trimmed.to_string(),
        })
}

pub fn parse_decimal(field: &'static str, raw: &str) -> Validated<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed).map_err(|_| ValidationError::InvalidNumber {
        field,
        value: trimmed.to_string(),
    })
}

fn parse_non_negative(field: &'static str, raw: &str) -> Validated<Decimal> {
    let value = parse_decimal(field, raw)?;
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative(field));
    }
    Ok(value)
}

fn required<'a>(field: &'static str, raw: &'a str) -> Validated<&'a str> {
    optional(raw).ok_or(ValidationError::MissingField(field))
}

fn optional(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn provided(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().and_then(optional)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coffee_form() -> TransactionForm {
        TransactionForm {
            description: "Coffee".into(),
            amount: "4.50".into(),
            category: "food & dining".into(),
            kind: TransactionKind::Expense,
            date: "2025-03-10".into(),
        }
    }

    #[test]
    fn transaction_form_signs_and_canonicalizes() {
        let draft = coffee_form().parse().unwrap();
        assert_eq!(draft.amount, Decimal::new(-450, 2));
        assert_eq!(draft.category, "Food & Dining");
        assert_eq!(
            draft.date,
            Some(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn transaction_form_rejects_bad_input() {
        let mut form = coffee_form();
        form.amount = "0".into();
        assert_eq!(form.parse(), Err(ValidationError::ZeroAmount));

        form.amount = "four".into();
        assert!(matches!(
            form.parse(),
            Err(ValidationError::InvalidNumber { field: "amount", .. })
        ));

        form.amount = "4".into();
        form.description = "   ".into();
        assert_eq!(form.parse(), Err(ValidationError::MissingField("description")));

        let mut form = coffee_form();
        form.category = "Groceries".into();
        assert_eq!(
            form.parse(),
            Err(ValidationError::UnknownCategory("Groceries".into()))
        );
    }

    #[test]
    fn update_form_requires_amount_with_kind() {
        let form = TransactionUpdateForm {
            kind: Some(TransactionKind::Income),
            ..Default::default()
        };
        assert_eq!(form.parse(), Err(ValidationError::MissingField("amount")));

        let form = TransactionUpdateForm {
            amount: Some("-12".into()),
            kind: Some(TransactionKind::Income),
            ..Default::default()
        };
        assert_eq!(form.parse().unwrap().amount, Some(Decimal::new(12, 0)));
    }

    #[test]
    fn budget_form_rejects_partial_allocations() {
        let form = BudgetForm {
            limit: "2000".into(),
            categories: vec![
                BudgetCategoryForm::new("Rent", "50"),
                BudgetCategoryForm::new("Food", "45"),
            ],
            month: String::new(),
        };
        assert_eq!(
            form.parse(),
            Err(ValidationError::PercentageTotal("95".into()))
        );
    }

    #[test]
    fn budget_form_requires_positive_limit() {
        let form = BudgetForm {
            limit: "-5".into(),
            categories: vec![BudgetCategoryForm::new("All", "100")],
            month: String::new(),
        };
        assert_eq!(form.parse(), Err(ValidationError::NotPositive("limit")));
    }

    #[test]
    fn recurring_form_defaults_frequency() {
        let form = RecurringExpenseForm {
            name: "Netflix".into(),
            category: "entertainment".into(),
            amount: "15.99".into(),
            frequency: String::new(),
            next_due_date: "2025-04-01".into(),
        };
        let draft = form.parse().unwrap();
        assert_eq!(draft.frequency, Frequency::Monthly);
        assert_eq!(draft.category, "Entertainment");

        let form = RecurringExpenseForm {
            frequency: "daily".into(),
            ..form
        };
        assert_eq!(
            form.parse(),
            Err(ValidationError::UnknownFrequency("daily".into()))
        );
    }

    #[test]
    fn goal_form_defaults_current_amount() {
        let form = GoalForm {
            name: "Vacation".into(),
            target_amount: "1500".into(),
            current_amount: String::new(),
            deadline: "2026-06-01".into(),
        };
        let draft = form.parse().unwrap();
        assert_eq!(draft.current_amount, Decimal::ZERO);

        let missing = GoalForm {
            deadline: String::new(),
            ..form
        };
        assert_eq!(missing.parse(), Err(ValidationError::MissingField("deadline")));
    }

    #[test]
    fn goal_progress_rejects_negative() {
        assert_eq!(
            parse_goal_progress("-1"),
            Err(ValidationError::Negative("current amount"))
        );
        assert_eq!(parse_goal_progress("250.5"), Ok(Decimal::new(2505, 1)));
    }

    #[test]
    fn settings_form_checks_theme_and_currency() {
        let form = SettingsForm {
            theme: Some("DARK".into()),
            currency: Some("eur".into()),
            ..Default::default()
        };
        let patch = form.parse().unwrap();
        assert_eq!(patch.theme, Some(Theme::Dark));
        assert_eq!(patch.currency, Some(Currency::Eur));

        let form = SettingsForm {
            currency: Some("XYZ".into()),
            ..Default::default()
        };
        assert_eq!(
            form.parse(),
            Err(ValidationError::UnsupportedCurrency("XYZ".into()))
        );

        let form = SettingsForm {
            email: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(form.parse(), Err(ValidationError::MissingField("email")));
    }
}
