use async_trait::async_trait;
use fs_err as fs;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{DesignError, Result};
use crate::wire::{DesignRecipe, Wedding};

/// Where wedding records live and where finished designs go back to.
#[async_trait]
pub trait WeddingStore: Send + Sync {
    /// `InputMissing` when the id does not resolve.
    async fn fetch(&self, wedding_id: &str) -> Result<Wedding>;

    /// Replace the wedding's design wholesale.
    async fn write_design(&self, wedding_id: &str, recipe: &DesignRecipe) -> Result<()>;
}

/// In-process store keyed by wedding id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    weddings: RwLock<HashMap<String, Wedding>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weddings(weddings: impl IntoIterator<Item = Wedding>) -> Self {
        let store = Self::new();
        for w in weddings {
            store.insert(w);
        }
        store
    }

    pub fn insert(&self, wedding: Wedding) {
        self.weddings.write().insert(wedding.id.clone(), wedding);
    }

    pub fn get(&self, wedding_id: &str) -> Option<Wedding> {
        self.weddings.read().get(wedding_id).cloned()
    }
}

#[async_trait]
impl WeddingStore for MemoryStore {
    async fn fetch(&self, wedding_id: &str) -> Result<Wedding> {
        self.get(wedding_id)
            .ok_or_else(|| DesignError::InputMissing(wedding_id.to_string()))
    }

    async fn write_design(&self, wedding_id: &str, recipe: &DesignRecipe) -> Result<()> {
        let mut weddings = self.weddings.write();
        let wedding = weddings
            .get_mut(wedding_id)
            .ok_or_else(|| DesignError::InputMissing(wedding_id.to_string()))?;
        wedding.design = Some(recipe.clone());
        Ok(())
    }
}

/// A single JSON document `{ "weddings": [...] }` on disk. Records are kept as
/// raw JSON so a write touches only the target's `design` attribute; fields
/// this crate does not model survive untouched. Writes go to a temp file in
/// the same directory and are renamed into place.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

fn has_id(record: &Value, wedding_id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(wedding_id)
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_doc(&self) -> Result<Value> {
        let text = fs::read_to_string(&self.path).map_err(|e| DesignError::Store(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| DesignError::Store(format!("parsing {}: {e}", self.path.display())))
    }

    fn records<'a>(&self, doc: &'a mut Value) -> Result<&'a mut Vec<Value>> {
        doc.get_mut("weddings")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                DesignError::Store(format!("{}: no \"weddings\" array", self.path.display()))
            })
    }

    fn write_doc(&self, doc: &Value) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let body = serde_json::to_vec_pretty(doc).map_err(|e| DesignError::Store(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| DesignError::Store(e.to_string()))?;
        tmp.write_all(&body).map_err(|e| DesignError::Store(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| DesignError::Store(e.error.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl WeddingStore for JsonFileStore {
    async fn fetch(&self, wedding_id: &str) -> Result<Wedding> {
        let mut doc = self.read_doc()?;
        let record = self
            .records(&mut doc)?
            .iter_mut()
            .find(|r| has_id(r, wedding_id))
            .ok_or_else(|| DesignError::InputMissing(wedding_id.to_string()))?;
        // Only the requested record is decoded; neighbours may be in any shape.
        serde_json::from_value(record.take())
            .map_err(|e| DesignError::Store(format!("wedding {wedding_id}: {e}")))
    }

    async fn write_design(&self, wedding_id: &str, recipe: &DesignRecipe) -> Result<()> {
        // Read-modify-write of the whole document; serialize writers so two
        // weddings updated at once don't drop each other's change.
        let _guard = self.write_lock.lock();
        let design = serde_json::to_value(recipe).map_err(|e| DesignError::Store(e.to_string()))?;
        let mut doc = self.read_doc()?;
        let record = self
            .records(&mut doc)?
            .iter_mut()
            .find(|r| has_id(r, wedding_id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| DesignError::InputMissing(wedding_id.to_string()))?;
        record.insert("design".to_string(), design);
        self.write_doc(&doc)?;
        debug!(wedding_id, path = %self.path.display(), "design written");
        Ok(())
    }
}
