#![doc(test(attr(deny(warnings))))]

//! Ledgerwise keeps a personal ledger of transactions, monthly budgets,
//! recurring expenses and savings goals, and derives the balances, budget
//! progress and goal projections a finance dashboard shows.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    init_with(None);
}

/// Like [`init`], with an extra filter directive such as `ledgerwise=debug`.
pub fn init_with(log_filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing_with(log_filter);
        tracing::info!("Ledgerwise tracing initialized.");
    });
}
