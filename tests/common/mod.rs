#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use ledgerwise::core::{Clock, LedgerStore};
use ledgerwise::storage::{JsonStorage, MemoryStorage};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Clock that starts at a fixed instant and moves one second forward per
/// reading, so records created in sequence get distinct timestamps.
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub fn starting_at(instant: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            next: Mutex::new(instant),
        })
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("lock clock");
        let current = *next;
        *next = current + Duration::seconds(1);
        current
    }
}

/// Mid-June 2025, far enough from a month boundary for the stepping clock.
pub fn test_clock() -> Arc<SteppingClock> {
    SteppingClock::starting_at(Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap())
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

pub fn json_store(dir: &PathBuf) -> LedgerStore {
    let storage = JsonStorage::new(Some(dir.clone())).expect("create json storage backend");
    LedgerStore::open_with_clock(Box::new(storage), test_clock()).expect("open json store")
}

/// Store over in-memory storage; the returned handle shares its state.
pub fn memory_store() -> (LedgerStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = LedgerStore::open_with_clock(Box::new(storage.clone()), test_clock())
        .expect("open memory store");
    (store, storage)
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal literal")
}
