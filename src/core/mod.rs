pub mod services;
pub mod store;
pub mod time;
pub mod validation;

pub use store::{LedgerStore, SharedLedgerStore};
pub use time::{Clock, FixedClock, SystemClock};
