use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, Selectable, Timestamped, PERCENTAGE_TOLERANCE};
use crate::errors::ValidationError;

/// A monthly spending plan split into percentage buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub limit: Decimal,
    pub categories: Vec<BudgetCategory>,
    pub month: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

/// One allocation bucket of a [`Budget`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub name: String,
    pub percentage: Decimal,
}

impl BudgetCategory {
    pub fn new(name: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            name: name.into(),
            percentage,
        }
    }

    /// Share of `limit` allocated to this bucket.
    pub fn budgeted(&self, limit: Decimal) -> Decimal {
        limit.saturating_mul(self.percentage / Decimal::ONE_HUNDRED)
    }
}

impl Budget {
    pub fn from_draft(draft: BudgetDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            limit: draft.limit,
            categories: draft.categories,
            month: draft.month.unwrap_or(created_at),
            created_at,
            is_active: false,
        }
    }

    pub fn category(&self, name: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn percentage_total(&self) -> Decimal {
        percentage_total(&self.categories)
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Timestamped for Budget {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Selectable for Budget {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

/// Validated budget input. `month` defaults to the creation time on create
/// and to the existing value on update.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDraft {
    pub limit: Decimal,
    pub categories: Vec<BudgetCategory>,
    pub month: Option<DateTime<Utc>>,
}

impl BudgetDraft {
    pub fn new(limit: Decimal, categories: Vec<BudgetCategory>) -> Self {
        Self {
            limit,
            categories,
            month: None,
        }
    }

    /// Checks every structural budget invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.limit <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("limit"));
        }
        validate_categories(&self.categories)
    }
}

pub fn percentage_total(categories: &[BudgetCategory]) -> Decimal {
    categories
        .iter()
        .fold(Decimal::ZERO, |total, category| total.saturating_add(category.percentage))
}

/// Rounds the total to one decimal (half away from zero) before comparing it
/// against 100 with [`PERCENTAGE_TOLERANCE`].
pub fn percentages_balance(total: Decimal) -> bool {
    let rounded = total.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    (rounded - Decimal::ONE_HUNDRED).abs() <= PERCENTAGE_TOLERANCE
}

pub fn validate_categories(categories: &[BudgetCategory]) -> Result<(), ValidationError> {
    if categories.is_empty() {
        return Err(ValidationError::NoCategories);
    }
    let mut seen = HashSet::new();
    for category in categories {
        let name = category.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(ValidationError::DuplicateCategory(name.to_string()));
        }
        if category.percentage < Decimal::ZERO || category.percentage > Decimal::ONE_HUNDRED {
            return Err(ValidationError::PercentageOutOfRange {
                name: name.to_string(),
                value: category.percentage.to_string(),
            });
        }
    }
    let total = percentage_total(categories);
    if !percentages_balance(total) {
        return Err(ValidationError::PercentageTotal(total.normalize().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    fn split(percentages: &[&str]) -> Vec<BudgetCategory> {
        percentages
            .iter()
            .enumerate()
            .map(|(idx, pct)| BudgetCategory::new(format!("Bucket {idx}"), dec(pct)))
            .collect()
    }

    #[test]
    fn accepts_totals_within_tolerance() {
        assert!(validate_categories(&split(&["50", "50"])).is_ok());
        assert!(validate_categories(&split(&["49.95", "49.9"])).is_ok());
        assert!(validate_categories(&split(&["33.3", "33.3", "33.3"])).is_ok());
        assert!(validate_categories(&split(&["60", "40.1"])).is_ok());
    }

    #[test]
    fn rejects_totals_outside_tolerance() {
        let err = validate_categories(&split(&["45", "44.9"])).unwrap_err();
        assert_eq!(err, ValidationError::PercentageTotal("89.9".into()));
        assert!(validate_categories(&split(&["50", "45"])).is_err());
        assert!(validate_categories(&split(&["60", "40.2"])).is_err());
    }

    #[test]
    fn rejects_duplicate_names_ignoring_case() {
        let categories = vec![
            BudgetCategory::new("Rent", dec("50")),
            BudgetCategory::new("rent", dec("50")),
        ];
        assert_eq!(
            validate_categories(&categories),
            Err(ValidationError::DuplicateCategory("rent".into()))
        );
    }

    #[test]
    fn rejects_blank_names_and_empty_lists() {
        assert_eq!(validate_categories(&[]), Err(ValidationError::NoCategories));
        let categories = vec![BudgetCategory::new("  ", dec("100"))];
        assert_eq!(
            validate_categories(&categories),
            Err(ValidationError::EmptyCategoryName)
        );
    }

    #[test]
    fn budgeted_share_follows_percentage() {
        let category = BudgetCategory::new("Rent", dec("50"));
        assert_eq!(category.budgeted(dec("2000")), dec("1000"));
    }

    #[test]
    fn draft_requires_positive_limit() {
        let draft = BudgetDraft::new(Decimal::ZERO, split(&["100"]));
        assert_eq!(draft.validate(), Err(ValidationError::NotPositive("limit")));
    }
}
