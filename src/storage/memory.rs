use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::RecordKind;

use super::{document_id, merge, with_id, Document, StorageBackend};

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<RecordKind, Vec<Document>>,
    settings: Option<Document>,
}

/// Ephemeral storage. Clones share the same state, so a test can keep a
/// handle after handing one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled every write fails with a persistence error; reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self, kind: RecordKind) -> usize {
        self.lock()
            .map(|state| state.collections.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Persistence("memory storage lock poisoned".into()))
    }

    fn writable(&self) -> Result<MutexGuard<'_, MemoryState>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Persistence("simulated write failure".into()));
        }
        self.lock()
    }
}

impl StorageBackend for MemoryStorage {
    fn load_all(&self, kind: RecordKind) -> Result<Vec<Document>> {
        Ok(self
            .lock()?
            .collections
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    fn create(&self, kind: RecordKind, document: Document) -> Result<Document> {
        let mut state = self.writable()?;
        let (_, document) = with_id(document);
        state
            .collections
            .entry(kind)
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    fn update(&self, kind: RecordKind, id: Uuid, partial: Document) -> Result<()> {
        let mut state = self.writable()?;
        let target = state
            .collections
            .get_mut(&kind)
            .and_then(|documents| {
                documents
                    .iter_mut()
                    .find(|document| document_id(document) == Some(id))
            })
            .ok_or_else(|| LedgerError::not_found(kind, id))?;
        merge(target, partial);
        Ok(())
    }

    fn delete(&self, kind: RecordKind, id: Uuid) -> Result<()> {
        let mut state = self.writable()?;
        let documents = state.collections.entry(kind).or_default();
        let before = documents.len();
        documents.retain(|document| document_id(document) != Some(id));
        if documents.len() == before {
            return Err(LedgerError::not_found(kind, id));
        }
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<Document>> {
        Ok(self.lock()?.settings.clone())
    }

    fn save_settings(&self, settings: &Document) -> Result<()> {
        self.writable()?.settings = Some(settings.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.writable()?;
        state.collections.clear();
        state.settings = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::partial;
    use serde_json::json;

    #[test]
    fn clones_share_state() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();
        storage
            .create(RecordKind::Transaction, partial([("amount", json!("-4.5"))]))
            .unwrap();
        assert_eq!(handle.count(RecordKind::Transaction), 1);
    }

    #[test]
    fn failing_writes_keep_reads_available() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let err = storage
            .create(RecordKind::Goal, Document::new())
            .unwrap_err();
        assert!(err.is_persistence());
        assert!(storage.load_all(RecordKind::Goal).unwrap().is_empty());
    }
}
