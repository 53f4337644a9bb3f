pub mod filter_service;
pub mod selection_service;
pub mod summary_service;

pub use filter_service::{FilterService, RecurringQuery, RecurringSort, TransactionQuery, TransactionSort};
pub use selection_service::SelectionService;
pub use summary_service::{
    BudgetProgress, BudgetStatus, CategoryProgress, MonthWindow, RecurringTotals, SpendingScope,
    SummaryService, TimeToGoal,
};
