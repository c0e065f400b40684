//! Accumulation store
//!
//! Records are only ever appended in batches or cleared all at once. The
//! export session lives next to them but survives a clear.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;
use crate::record::ProductRecord;
use crate::session::ExportSession;

/// Persistent home for extracted records and the export session.
///
/// Implementations must serialize their read-modify-write cycles so two
/// concurrent `append_all` calls never lose a batch and two concurrent
/// exports never get the same counter.
pub trait RecordStore: Send + Sync {
    fn get_all(&self) -> Result<Vec<ProductRecord>, StoreError>;

    /// Append `records` after the existing ones and return the new total.
    fn append_all(&self, records: &[ProductRecord]) -> Result<usize, StoreError>;

    /// Remove every record. The export session is kept.
    fn clear(&self) -> Result<(), StoreError>;

    fn session(&self) -> Result<ExportSession, StoreError>;

    fn set_session(&self, session: &ExportSession) -> Result<(), StoreError>;

    /// Claim the session for one export in a single step.
    ///
    /// Resolves the keyword against `page_url`, persists it with the
    /// counter moved one ahead, and returns the session the export should be
    /// named after (the counter before the bump).
    fn advance_session(&self, page_url: Option<&str>) -> Result<ExportSession, StoreError>;

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.get_all()?.len())
    }
}

/// On-disk layout, one JSON object with the same keys as the extension's
/// local storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    #[serde(default)]
    products: Vec<ProductRecord>,
    #[serde(default = "first_counter")]
    export_counter: u32,
    #[serde(default)]
    last_keyword: String,
}

fn first_counter() -> u32 {
    1
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            export_counter: first_counter(),
            last_keyword: String::new(),
        }
    }
}

impl StoreDocument {
    fn session(&self) -> ExportSession {
        ExportSession {
            keyword: self.last_keyword.clone(),
            counter: self.export_counter.max(1),
        }
    }

    fn set_session(&mut self, session: &ExportSession) {
        self.last_keyword = session.keyword.clone();
        self.export_counter = session.counter;
    }

    fn advance_session(&mut self, page_url: Option<&str>) -> ExportSession {
        let mut claimed = self.session();
        claimed.keyword = claimed.resolve_keyword(page_url);
        self.last_keyword = claimed.keyword.clone();
        self.export_counter = claimed.counter.saturating_add(1);
        claimed
    }
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// The file is created on first write; a missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // write-then-rename so a crash never leaves a half-written store
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut doc = self.load()?;
        let out = f(&mut doc);
        self.save(&doc)?;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> Result<T, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&self.load()?))
    }
}

impl RecordStore for JsonFileStore {
    fn get_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        self.read(|doc| doc.products.clone())
    }

    fn append_all(&self, records: &[ProductRecord]) -> Result<usize, StoreError> {
        let total = self.update(|doc| {
            doc.products.extend_from_slice(records);
            doc.products.len()
        })?;
        info!(added = records.len(), total, path = %self.path.display(), "records appended");
        Ok(total)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.update(|doc| doc.products.clear())?;
        info!(path = %self.path.display(), "store cleared");
        Ok(())
    }

    fn session(&self) -> Result<ExportSession, StoreError> {
        self.read(StoreDocument::session)
    }

    fn set_session(&self, session: &ExportSession) -> Result<(), StoreError> {
        self.update(|doc| doc.set_session(session))
    }

    fn advance_session(&self, page_url: Option<&str>) -> Result<ExportSession, StoreError> {
        self.update(|doc| doc.advance_session(page_url))
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.read(|doc| doc.products.len())
    }
}

/// Store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<StoreDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_doc<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> Result<T, StoreError> {
        let mut doc = self.doc.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut doc))
    }
}

impl RecordStore for MemoryStore {
    fn get_all(&self) -> Result<Vec<ProductRecord>, StoreError> {
        self.with_doc(|doc| doc.products.clone())
    }

    fn append_all(&self, records: &[ProductRecord]) -> Result<usize, StoreError> {
        self.with_doc(|doc| {
            doc.products.extend_from_slice(records);
            doc.products.len()
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_doc(|doc| doc.products.clear())
    }

    fn session(&self) -> Result<ExportSession, StoreError> {
        self.with_doc(|doc| doc.session())
    }

    fn set_session(&self, session: &ExportSession) -> Result<(), StoreError> {
        self.with_doc(|doc| doc.set_session(session))
    }

    fn advance_session(&self, page_url: Option<&str>) -> Result<ExportSession, StoreError> {
        self.with_doc(|doc| doc.advance_session(page_url))
    }
}
