//! Keeps the "current" flag consistent across budgets and goals.

use uuid::Uuid;

use crate::ledger::{most_recent, Selectable};

pub struct SelectionService;

impl SelectionService {
    pub fn current<T: Selectable>(records: &[T]) -> Option<&T> {
        records.iter().find(|record| record.is_active())
    }

    /// Makes `id` the only current record. Returns the ids whose flag changed,
    /// or `None` when `id` is not in the collection.
    pub fn select<T: Selectable>(records: &mut [T], id: Uuid) -> Option<Vec<Uuid>> {
        if !records.iter().any(|record| record.id() == id) {
            return None;
        }
        let mut changed = Vec::new();
        for record in records.iter_mut() {
            let wanted = record.id() == id;
            if record.is_active() != wanted {
                record.set_active(wanted);
                changed.push(record.id());
            }
        }
        Some(changed)
    }

    /// Restores "exactly one current record" for a non-empty collection.
    ///
    /// With several flagged records the most recently created keeps the flag;
    /// with none, the most recently created overall is promoted. Returns the
    /// ids whose flag changed.
    pub fn ensure_current<T: Selectable>(records: &mut [T]) -> Vec<Uuid> {
        let flagged: Vec<&T> = records.iter().filter(|record| record.is_active()).collect();
        let keep = match flagged.len() {
            1 => return Vec::new(),
            0 => most_recent(records).map(|record| record.id()),
            _ => flagged
                .into_iter()
                .reduce(|best, candidate| {
                    if candidate.created_at() > best.created_at() {
                        candidate
                    } else {
                        best
                    }
                })
                .map(|record| record.id()),
        };
        match keep {
            Some(id) => Self::select(records, id).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Goal, GoalDraft};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn goals(count: i64) -> Vec<Goal> {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|offset| {
                Goal::from_draft(
                    GoalDraft {
                        name: format!("goal-{offset}"),
                        target_amount: Decimal::from(100),
                        current_amount: Decimal::ZERO,
                        deadline: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                    },
                    base + Duration::days(offset),
                )
            })
            .collect()
    }

    #[test]
    fn select_clears_other_flags() {
        let mut records = goals(3);
        records[0].is_active = true;
        let target = records[2].id;
        let changed = SelectionService::select(&mut records, target).unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(SelectionService::current(&records).map(|g| g.id), Some(target));
        assert!(SelectionService::select(&mut records, Uuid::new_v4()).is_none());
    }

    #[test]
    fn ensure_current_promotes_most_recent() {
        let mut records = goals(3);
        let changed = SelectionService::ensure_current(&mut records);
        assert_eq!(changed, vec![records[2].id]);
        assert!(records[2].is_active);
    }

    #[test]
    fn ensure_current_collapses_duplicates() {
        let mut records = goals(3);
        records[0].is_active = true;
        records[1].is_active = true;
        SelectionService::ensure_current(&mut records);
        let active: Vec<_> = records.iter().filter(|g| g.is_active).map(|g| g.name.as_str()).collect();
        assert_eq!(active, vec!["goal-1"]);
    }

    #[test]
    fn ensure_current_on_empty_is_noop() {
        let mut records: Vec<Goal> = Vec::new();
        assert!(SelectionService::ensure_current(&mut records).is_empty());
    }
}
