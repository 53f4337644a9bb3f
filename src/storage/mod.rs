pub mod json_backend;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::RecordKind;

/// A stored record: a JSON object keyed by camelCase field names.
pub type Document = Map<String, Value>;

/// Document-style persistence provider, one collection per [`RecordKind`]
/// plus a single settings record.
///
/// Implementations only need read-your-writes consistency for a single call;
/// multi-record changes are issued as independent updates.
pub trait StorageBackend: Send + Sync {
    fn load_all(&self, kind: RecordKind) -> Result<Vec<Document>>;

    /// Stores a new record. A document without an `id` gets one assigned; the
    /// stored document is returned.
    fn create(&self, kind: RecordKind, document: Document) -> Result<Document>;

    /// Merges `partial` into the stored record with `id`.
    fn update(&self, kind: RecordKind, id: Uuid, partial: Document) -> Result<()>;

    fn delete(&self, kind: RecordKind, id: Uuid) -> Result<()>;

    fn load_settings(&self) -> Result<Option<Document>>;

    fn save_settings(&self, settings: &Document) -> Result<()>;

    /// Drops every collection and the settings record.
    fn clear(&self) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(LedgerError::Persistence(format!(
            "expected a JSON object, got `{other}`"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Builds a partial document from `(field, value)` pairs.
pub fn partial<I, K>(fields: I) -> Document
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields.into_iter().map(|(key, value)| (key.into(), value)).collect()
}

fn document_id(document: &Document) -> Option<Uuid> {
    document
        .get("id")
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

/// Assigns a fresh `id` when the document does not carry a valid one.
fn with_id(mut document: Document) -> (Uuid, Document) {
    let id = match document_id(&document) {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            document.insert("id".into(), Value::String(id.to_string()));
            id
        }
    };
    (id, document)
}

fn merge(target: &mut Document, partial: Document) {
    for (key, value) in partial {
        if key != "id" {
            target.insert(key, value);
        }
    }
}
