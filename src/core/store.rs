//! The single owner of every ledger collection and the user settings.
//!
//! Mutations update memory first and then mirror the affected records to the
//! storage backend. A failed write is returned as
//! [`LedgerError::Persistence`] and logged, but the in-memory change stays in
//! place. Validation and lookup failures are raised before anything changes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, StorageKind};
use crate::core::services::{
    BudgetProgress, FilterService, RecurringQuery, RecurringTotals, SelectionService,
    SpendingScope, SummaryService, TimeToGoal, TransactionQuery,
};
use crate::core::time::{Clock, SystemClock};
use crate::errors::{LedgerError, Result, ValidationError};
use crate::ledger::{
    Budget, BudgetDraft, ExpenseStatus, Goal, GoalDraft, Identifiable, RecordKind,
    RecurringExpense, RecurringExpenseDraft, Selectable, Settings, SettingsPatch, Transaction,
    TransactionDraft, TransactionPatch,
};
use crate::storage::{
    from_document, partial, to_document, JsonStorage, MemoryStorage, StorageBackend,
};

/// Store guarded for hosts that share it across threads. Hold the lock for the
/// whole read or mutation.
pub type SharedLedgerStore = Arc<Mutex<LedgerStore>>;

pub struct LedgerStore {
    /// Newest first.
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    recurring: Vec<RecurringExpense>,
    goals: Vec<Goal>,
    settings: Settings,
    spending_scope: SpendingScope,
    storage: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl LedgerStore {
    /// Seeds the store from `storage` using the system clock.
    pub fn open(storage: Box<dyn StorageBackend>) -> Result<Self> {
        Self::open_with_clock(storage, Arc::new(SystemClock))
    }

    /// Seeds the store from `storage`.
    ///
    /// Records that fail to deserialize are skipped with a warning. When no
    /// settings record exists the defaults are written. If stored budgets or
    /// goals carry no current flag, the most recently created one is promoted.
    pub fn open_with_clock(storage: Box<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut transactions: Vec<Transaction> = load_collection(storage.as_ref(), RecordKind::Transaction)?;
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut budgets: Vec<Budget> = load_collection(storage.as_ref(), RecordKind::Budget)?;
        let recurring = load_collection(storage.as_ref(), RecordKind::RecurringExpense)?;
        let mut goals: Vec<Goal> = load_collection(storage.as_ref(), RecordKind::Goal)?;

        let budget_flips = SelectionService::ensure_current(&mut budgets);
        let goal_flips = SelectionService::ensure_current(&mut goals);
        log_failure(
            "restore budget selection",
            sync_flags(storage.as_ref(), RecordKind::Budget, &budgets, &budget_flips),
        );
        log_failure(
            "restore goal selection",
            sync_flags(storage.as_ref(), RecordKind::Goal, &goals, &goal_flips),
        );

        let settings = match storage.load_settings()? {
            Some(document) => from_document(document).unwrap_or_else(|err| {
                warn!(error = %err, "stored settings unreadable; using defaults");
                Settings::default()
            }),
            None => {
                let defaults = Settings::default();
                log_failure("initialize settings", save_settings(storage.as_ref(), &defaults));
                defaults
            }
        };

        info!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            recurring = recurring.len(),
            goals = goals.len(),
            "ledger store opened"
        );

        Ok(Self {
            transactions,
            budgets,
            recurring,
            goals,
            settings,
            spending_scope: SpendingScope::default(),
            storage,
            clock,
        })
    }

    /// Opens the storage provider named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let storage: Box<dyn StorageBackend> = match config.storage {
            StorageKind::Json => Box::new(JsonStorage::new(Some(config.resolve_data_dir()))?),
            StorageKind::Memory => Box::new(MemoryStorage::new()),
        };
        info!(storage = %config.storage, "opening ledger store");
        Self::open(storage)
    }

    pub fn into_shared(self) -> SharedLedgerStore {
        Arc::new(Mutex::new(self))
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn spending_scope(&self) -> SpendingScope {
        self.spending_scope
    }

    /// Switches how category spend is attributed to budgets.
    pub fn set_spending_scope(&mut self, scope: SpendingScope) {
        self.spending_scope = scope;
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ----- accessors -------------------------------------------------------

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        find(&self.transactions, id)
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.budgets
    }

    pub fn budget(&self, id: Uuid) -> Option<&Budget> {
        find(&self.budgets, id)
    }

    pub fn current_budget(&self) -> Option<&Budget> {
        SelectionService::current(&self.budgets)
    }

    pub fn recurring_expenses(&self) -> &[RecurringExpense] {
        &self.recurring
    }

    pub fn recurring_expense(&self, id: Uuid) -> Option<&RecurringExpense> {
        find(&self.recurring, id)
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: Uuid) -> Option<&Goal> {
        find(&self.goals, id)
    }

    pub fn current_goal(&self) -> Option<&Goal> {
        SelectionService::current(&self.goals)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ----- transactions ----------------------------------------------------

    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<Uuid> {
        draft.validate()?;
        let transaction = Transaction::from_draft(draft, self.now());
        let id = transaction.id;
        let document = to_document(&transaction)?;
        self.transactions.insert(0, transaction);
        debug!(%id, "transaction added");
        mirror(
            "add transaction",
            self.storage.create(RecordKind::Transaction, document).map(|_| ()),
        )?;
        Ok(id)
    }

    pub fn update_transaction(&mut self, id: Uuid, patch: TransactionPatch) -> Result<()> {
        patch.validate()?;
        let index = position(&self.transactions, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Transaction, id))?;
        let transaction = &mut self.transactions[index];
        patch.apply(transaction);
        let document = to_document(transaction)?;
        mirror(
            "update transaction",
            self.storage.update(RecordKind::Transaction, id, document),
        )
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let index = position(&self.transactions, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Transaction, id))?;
        self.transactions.remove(index);
        mirror(
            "delete transaction",
            self.storage.delete(RecordKind::Transaction, id),
        )
    }

    /// Removes every listed transaction that exists and returns how many were
    /// removed. Unknown ids are skipped. The first storage failure is returned
    /// after all removals have been attempted.
    pub fn delete_transactions(&mut self, ids: &[Uuid]) -> Result<usize> {
        delete_many(
            &mut self.transactions,
            self.storage.as_ref(),
            RecordKind::Transaction,
            ids,
        )
    }

    // ----- budgets ---------------------------------------------------------

    /// Creates a budget and makes it the current one.
    pub fn create_budget(&mut self, draft: BudgetDraft) -> Result<Uuid> {
        draft.validate()?;
        let budget = Budget::from_draft(draft, self.now());
        let id = budget.id;
        self.budgets.push(budget);
        insert_selected(&mut self.budgets, self.storage.as_ref(), RecordKind::Budget, id)?;
        Ok(id)
    }

    /// Replaces limit and categories in place. `month` changes only when the
    /// draft carries one; `createdAt` and the current flag are preserved.
    pub fn update_budget(&mut self, id: Uuid, draft: BudgetDraft) -> Result<()> {
        draft.validate()?;
        let index = position(&self.budgets, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Budget, id))?;
        let budget = &mut self.budgets[index];
        budget.limit = draft.limit;
        budget.categories = draft.categories;
        if let Some(month) = draft.month {
            budget.month = month;
        }
        let document = to_document(budget)?;
        mirror("update budget", self.storage.update(RecordKind::Budget, id, document))
    }

    pub fn delete_budget(&mut self, id: Uuid) -> Result<()> {
        remove_selectable(&mut self.budgets, self.storage.as_ref(), RecordKind::Budget, id)
    }

    pub fn select_budget(&mut self, id: Uuid) -> Result<()> {
        select(&mut self.budgets, self.storage.as_ref(), RecordKind::Budget, id)
    }

    // ----- recurring expenses ----------------------------------------------

    pub fn add_recurring_expense(&mut self, draft: RecurringExpenseDraft) -> Result<Uuid> {
        draft.validate()?;
        let expense = RecurringExpense::from_draft(draft, self.now());
        let id = expense.id;
        let document = to_document(&expense)?;
        self.recurring.push(expense);
        mirror(
            "add recurring expense",
            self.storage
                .create(RecordKind::RecurringExpense, document)
                .map(|_| ()),
        )?;
        Ok(id)
    }

    /// Rewrites the editable fields; status and `createdAt` are kept.
    pub fn update_recurring_expense(&mut self, id: Uuid, draft: RecurringExpenseDraft) -> Result<()> {
        draft.validate()?;
        let index = position(&self.recurring, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::RecurringExpense, id))?;
        let expense = &mut self.recurring[index];
        expense.name = draft.name;
        expense.category = draft.category;
        expense.amount = draft.amount;
        expense.frequency = draft.frequency;
        expense.next_due_date = draft.next_due_date;
        let document = to_document(expense)?;
        mirror(
            "update recurring expense",
            self.storage.update(RecordKind::RecurringExpense, id, document),
        )
    }

    pub fn set_recurring_status(&mut self, id: Uuid, status: ExpenseStatus) -> Result<()> {
        let index = position(&self.recurring, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::RecurringExpense, id))?;
        self.recurring[index].status = status;
        let status_value = serde_json::to_value(status)?;
        mirror(
            "update recurring status",
            self.storage.update(
                RecordKind::RecurringExpense,
                id,
                partial([("status", status_value)]),
            ),
        )
    }

    pub fn delete_recurring_expense(&mut self, id: Uuid) -> Result<()> {
        let index = position(&self.recurring, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::RecurringExpense, id))?;
        self.recurring.remove(index);
        mirror(
            "delete recurring expense",
            self.storage.delete(RecordKind::RecurringExpense, id),
        )
    }

    pub fn delete_recurring_expenses(&mut self, ids: &[Uuid]) -> Result<usize> {
        delete_many(
            &mut self.recurring,
            self.storage.as_ref(),
            RecordKind::RecurringExpense,
            ids,
        )
    }

    // ----- goals -----------------------------------------------------------

    /// Adds a goal and makes it the current one.
    pub fn add_goal(&mut self, draft: GoalDraft) -> Result<Uuid> {
        draft.validate()?;
        let goal = Goal::from_draft(draft, self.now());
        let id = goal.id;
        self.goals.push(goal);
        insert_selected(&mut self.goals, self.storage.as_ref(), RecordKind::Goal, id)?;
        Ok(id)
    }

    pub fn update_goal_progress(&mut self, id: Uuid, current_amount: Decimal) -> Result<()> {
        if current_amount < Decimal::ZERO {
            return Err(ValidationError::Negative("current amount").into());
        }
        let index = position(&self.goals, id)
            .ok_or_else(|| LedgerError::not_found(RecordKind::Goal, id))?;
        self.goals[index].current_amount = current_amount;
        let amount = serde_json::to_value(current_amount)?;
        mirror(
            "update goal progress",
            self.storage
                .update(RecordKind::Goal, id, partial([("currentAmount", amount)])),
        )
    }

    pub fn delete_goal(&mut self, id: Uuid) -> Result<()> {
        remove_selectable(&mut self.goals, self.storage.as_ref(), RecordKind::Goal, id)
    }

    pub fn select_goal(&mut self, id: Uuid) -> Result<()> {
        select(&mut self.goals, self.storage.as_ref(), RecordKind::Goal, id)
    }

    // ----- settings --------------------------------------------------------

    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<()> {
        if let Some(email) = &patch.email {
            if email.trim().is_empty() {
                return Err(ValidationError::MissingField("email").into());
            }
        }
        patch.apply(&mut self.settings);
        mirror("save settings", save_settings(self.storage.as_ref(), &self.settings))
    }

    /// Restores the first-run defaults.
    pub fn reset_settings(&mut self) -> Result<()> {
        self.settings = Settings::default();
        mirror("reset settings", save_settings(self.storage.as_ref(), &self.settings))
    }

    /// Empties every collection, restores default settings and wipes storage.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.transactions.clear();
        self.budgets.clear();
        self.recurring.clear();
        self.goals.clear();
        self.settings = Settings::default();
        info!("clearing all ledger data");
        mirror("clear storage", self.storage.clear())?;
        mirror("save settings", save_settings(self.storage.as_ref(), &self.settings))
    }

    // ----- derived figures -------------------------------------------------

    pub fn total_balance(&self) -> Decimal {
        SummaryService::total_balance(&self.transactions)
    }

    pub fn total_income(&self) -> Decimal {
        SummaryService::total_income(&self.transactions, self.now())
    }

    pub fn total_expenses(&self) -> Decimal {
        SummaryService::total_expenses(&self.transactions, self.now())
    }

    pub fn monthly_net_balance(&self) -> Decimal {
        SummaryService::monthly_net_balance(&self.transactions, self.now())
    }

    pub fn upcoming_bills(&self) -> Vec<&RecurringExpense> {
        SummaryService::upcoming_bills(&self.recurring, self.clock.today())
    }

    pub fn recent_transactions(&self) -> Vec<&Transaction> {
        SummaryService::recent_transactions(&self.transactions)
    }

    /// Spend against `category` of the given budget; zero when the budget is unknown.
    pub fn budget_category_spending(&self, budget_id: Uuid, category: &str) -> Decimal {
        self.budget(budget_id).map_or(Decimal::ZERO, |budget| {
            SummaryService::budget_category_spending(
                &self.transactions,
                budget,
                category,
                self.spending_scope,
            )
        })
    }

    pub fn budget_progress(&self, budget_id: Uuid) -> BudgetProgress {
        SummaryService::budget_progress(
            self.budget(budget_id),
            &self.transactions,
            self.spending_scope,
        )
    }

    pub fn current_budget_progress(&self) -> BudgetProgress {
        SummaryService::budget_progress(
            self.current_budget(),
            &self.transactions,
            self.spending_scope,
        )
    }

    pub fn goal_progress(&self, goal_id: Uuid) -> Option<Decimal> {
        self.goal(goal_id).map(SummaryService::goal_progress)
    }

    /// Months until the goal is met at this month's net balance.
    pub fn time_to_goal(&self, goal_id: Uuid) -> Option<TimeToGoal> {
        let net = self.monthly_net_balance();
        self.goal(goal_id)
            .map(|goal| SummaryService::time_to_goal(goal, net))
    }

    pub fn recurring_totals(&self) -> RecurringTotals {
        SummaryService::recurring_totals(&self.recurring)
    }

    pub fn filter_transactions(&self, query: &TransactionQuery) -> Vec<&Transaction> {
        FilterService::transactions(&self.transactions, query)
    }

    pub fn filter_recurring(&self, query: &RecurringQuery) -> Vec<&RecurringExpense> {
        FilterService::recurring(&self.recurring, query)
    }

    /// Formats `amount` in the configured display currency.
    pub fn format_money(&self, amount: Decimal) -> String {
        self.settings.currency.format(amount)
    }
}

fn find<T: Identifiable>(records: &[T], id: Uuid) -> Option<&T> {
    records.iter().find(|record| record.id() == id)
}

fn position<T: Identifiable>(records: &[T], id: Uuid) -> Option<usize> {
    records.iter().position(|record| record.id() == id)
}

fn load_collection<T: DeserializeOwned>(storage: &dyn StorageBackend, kind: RecordKind) -> Result<Vec<T>> {
    let documents = storage.load_all(kind)?;
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        match from_document(document) {
            Ok(record) => records.push(record),
            Err(err) => warn!(collection = kind.collection(), error = %err, "skipping unreadable record"),
        }
    }
    Ok(records)
}

fn save_settings(storage: &dyn StorageBackend, settings: &Settings) -> Result<()> {
    storage.save_settings(&to_document(settings)?)
}

/// Logs a failed write and hands the result back unchanged.
/// Logs a failed storage write. The store already checked the record exists,
/// so a backend `NotFound` means storage lost track of it (for example after
/// an earlier failed create) and is reported as a persistence error.
fn mirror<T>(action: &str, result: Result<T>) -> Result<T> {
    let result = result.map_err(|err| match err {
        LedgerError::NotFound { kind, id } => {
            LedgerError::Persistence(format!("{kind} {id} is missing from storage"))
        }
        other => other,
    });
    if let Err(err) = &result {
        warn!(action, error = %err, "storage write failed; in-memory state kept");
    }
    result
}

fn log_failure(action: &str, result: Result<()>) {
    let _ = mirror(action, result);
}

/// Writes the current flag of each record in `ids`. Every update is attempted;
/// the first failure is returned.
fn sync_flags<T: Selectable>(
    storage: &dyn StorageBackend,
    kind: RecordKind,
    records: &[T],
    ids: &[Uuid],
) -> Result<()> {
    let mut first_error = None;
    for id in ids {
        let Some(record) = find(records, *id) else {
            continue;
        };
        let flag = partial([("isActive", Value::Bool(record.is_active()))]);
        if let Err(err) = storage.update(kind, *id, flag) {
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// Persists a freshly pushed record after making it the current selection.
fn insert_selected<T: Selectable + Serialize>(
    records: &mut [T],
    storage: &dyn StorageBackend,
    kind: RecordKind,
    id: Uuid,
) -> Result<()> {
    let flipped: Vec<Uuid> = SelectionService::select(records, id)
        .unwrap_or_default()
        .into_iter()
        .filter(|changed| *changed != id)
        .collect();
    let document = match find(records, id) {
        Some(record) => to_document(record)?,
        None => return Err(LedgerError::not_found(kind, id)),
    };
    debug!(collection = kind.collection(), %id, "record created and selected");
    let created = mirror("create", storage.create(kind, document).map(|_| ()));
    let synced = mirror("update selection", sync_flags(storage, kind, records, &flipped));
    created.and(synced)
}

fn select<T: Selectable>(
    records: &mut [T],
    storage: &dyn StorageBackend,
    kind: RecordKind,
    id: Uuid,
) -> Result<()> {
    let changed =
        SelectionService::select(records, id).ok_or_else(|| LedgerError::not_found(kind, id))?;
    mirror("update selection", sync_flags(storage, kind, records, &changed))
}

/// Removes a selectable record and, if it was current, promotes the most
/// recently created survivor.
fn remove_selectable<T: Selectable>(
    records: &mut Vec<T>,
    storage: &dyn StorageBackend,
    kind: RecordKind,
    id: Uuid,
) -> Result<()> {
    let index = position(records, id).ok_or_else(|| LedgerError::not_found(kind, id))?;
    let removed = records.remove(index);
    let promoted = if removed.is_active() {
        SelectionService::ensure_current(records)
    } else {
        Vec::new()
    };
    if let Some(next) = promoted.first() {
        info!(collection = kind.collection(), %next, "current selection moved after delete");
    }
    let deleted = mirror("delete", storage.delete(kind, id));
    let synced = mirror("update selection", sync_flags(storage, kind, records, &promoted));
    deleted.and(synced)
}

fn delete_many<T: Identifiable>(
    records: &mut Vec<T>,
    storage: &dyn StorageBackend,
    kind: RecordKind,
    ids: &[Uuid],
) -> Result<usize> {
    let mut removed = 0;
    let mut first_error = None;
    for id in ids {
        let Some(index) = position(records, *id) else {
            continue;
        };
        records.remove(index);
        removed += 1;
        if let Err(err) = mirror("bulk delete", storage.delete(kind, *id)) {
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(removed),
    }
}
