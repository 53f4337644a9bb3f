use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::RecordKind;
use crate::utils::paths;

use super::{document_id, merge, with_id, Document, StorageBackend};

const TMP_SUFFIX: &str = "tmp";
const SETTINGS_FILE: &str = "settings.json";

/// Filesystem persistence: one JSON array per collection plus a settings file.
///
/// Every write rewrites the whole collection through a temporary file that is
/// renamed into place.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let root = root.unwrap_or_else(paths::data_dir);
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, kind: RecordKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.collection()))
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    fn read_collection(&self, kind: RecordKind) -> Result<Vec<Document>> {
        let path = self.collection_path(kind);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        let values: Vec<Value> = serde_json::from_str(&data)?;
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => Ok(map),
                other => Err(LedgerError::Persistence(format!(
                    "{} contains a non-object entry: {other}",
                    path.display()
                ))),
            })
            .collect()
    }

    fn write_collection(&self, kind: RecordKind, documents: Vec<Document>) -> Result<()> {
        let path = self.collection_path(kind);
        let values: Vec<Value> = documents.into_iter().map(Value::Object).collect();
        let json = serde_json::to_string_pretty(&values)?;
        replace_file(&path, &json)?;
        debug!(collection = kind.collection(), count = values.len(), "collection written");
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load_all(&self, kind: RecordKind) -> Result<Vec<Document>> {
        self.read_collection(kind)
    }

    fn create(&self, kind: RecordKind, document: Document) -> Result<Document> {
        let (_, document) = with_id(document);
        let mut documents = self.read_collection(kind)?;
        documents.push(document.clone());
        self.write_collection(kind, documents)?;
        Ok(document)
    }

    fn update(&self, kind: RecordKind, id: Uuid, partial: Document) -> Result<()> {
        let mut documents = self.read_collection(kind)?;
        let target = documents
            .iter_mut()
            .find(|document| document_id(document) == Some(id))
            .ok_or_else(|| LedgerError::not_found(kind, id))?;
        merge(target, partial);
        self.write_collection(kind, documents)
    }

    fn delete(&self, kind: RecordKind, id: Uuid) -> Result<()> {
        let mut documents = self.read_collection(kind)?;
        let before = documents.len();
        documents.retain(|document| document_id(document) != Some(id));
        if documents.len() == before {
            return Err(LedgerError::not_found(kind, id));
        }
        self.write_collection(kind, documents)
    }

    fn load_settings(&self) -> Result<Option<Document>> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        match serde_json::from_str::<Value>(&data)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(LedgerError::Persistence(format!(
                "{} does not hold a settings object",
                path.display()
            ))),
        }
    }

    fn save_settings(&self, settings: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        replace_file(&self.settings_path(), &json)
    }

    fn clear(&self) -> Result<()> {
        for kind in RecordKind::ALL {
            let path = self.collection_path(kind);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        let settings = self.settings_path();
        if settings.exists() {
            fs::remove_file(settings)?;
        }
        Ok(())
    }
}

fn replace_file(path: &Path, data: &str) -> Result<()> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::partial;
    use serde_json::json;

    #[test]
    fn tmp_path_appends_suffix() {
        let path = Path::new("/data/goals.json");
        assert_eq!(tmp_path(path), PathBuf::from("/data/goals.json.tmp"));
    }

    #[test]
    fn writes_leave_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(dir.path().to_path_buf())).unwrap();
        storage
            .create(RecordKind::Goal, partial([("name", json!("Bike"))]))
            .unwrap();
        let path = storage.collection_path(RecordKind::Goal);
        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn update_of_unknown_record_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(Some(dir.path().to_path_buf())).unwrap();
        let err = storage
            .update(RecordKind::Budget, Uuid::new_v4(), Document::new())
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { kind: RecordKind::Budget, .. }));
    }
}
