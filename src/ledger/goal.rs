use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{Identifiable, Selectable, Timestamped};
use crate::errors::ValidationError;

/// A savings target with a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
}

impl Goal {
    pub fn from_draft(draft: GoalDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            target_amount: draft.target_amount,
            current_amount: draft.current_amount,
            deadline: draft.deadline,
            created_at,
            is_active: false,
        }
    }

    /// Saved amount clamped to `[0, target]` for display purposes.
    pub fn clamped_amount(&self) -> Decimal {
        self.current_amount
            .max(Decimal::ZERO)
            .min(self.target_amount.max(Decimal::ZERO))
    }

    /// Amount still missing; zero once the target is met.
    pub fn remaining(&self) -> Decimal {
        self.target_amount
            .saturating_sub(self.current_amount)
            .max(Decimal::ZERO)
    }
}

impl Identifiable for Goal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Timestamped for Goal {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Selectable for Goal {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
}

impl GoalDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(ValidationError::NotPositive("target amount"));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(ValidationError::Negative("current amount"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: i64, current: i64) -> Goal {
        Goal::from_draft(
            GoalDraft {
                name: "Emergency fund".into(),
                target_amount: Decimal::from(target),
                current_amount: Decimal::from(current),
                deadline: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn clamps_overshoot_to_target() {
        let g = goal(1000, 1200);
        assert_eq!(g.clamped_amount(), Decimal::from(1000));
        assert_eq!(g.remaining(), Decimal::ZERO);
    }

    #[test]
    fn clamps_negative_to_zero() {
        let g = goal(1000, -50);
        assert_eq!(g.clamped_amount(), Decimal::ZERO);
        assert_eq!(g.remaining(), Decimal::from(1050));
    }
}
