use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StorageError;
use crate::pipeline::segment::Section;

/// Opaque document identifier (v4 UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a caller-supplied id. Anything that is not a UUID cannot
    /// name a stored document, so it parses to `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Persisted result of ingesting one document. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(rename = "text")]
    pub raw_text: String,
    #[serde(rename = "cleaned_text")]
    pub normalized_text: String,
    pub sections: Vec<Section>,
}

/// Document persistence abstraction (allows in-memory stores for tests).
pub trait DocumentStore {
    /// Write a new record. Existing ids are never overwritten.
    fn save(&self, id: &DocumentId, record: &DocumentRecord) -> Result<(), StorageError>;

    /// Fetch a record; `Ok(None)` when the id is unknown.
    fn load(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StorageError>;
}

/// One pretty-printed `doc_<id>.json` file per document.
pub struct FileDocumentStore {
    root: PathBuf,
}

impl FileDocumentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path_for(&self, id: &DocumentId) -> PathBuf {
        self.root.join(format!("doc_{id}.json"))
    }

    /// Number of stored documents.
    #[cfg(test)]
    pub(crate) fn document_count(&self) -> Result<usize, StorageError> {
        let mut count = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if name.starts_with("doc_") && name.ends_with(".json") {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Remove a partially written record so a failed save leaves nothing behind.
fn discard_on_failure(path: &Path, written: std::io::Result<()>) -> Result<(), StorageError> {
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial record");
        }
        return Err(e.into());
    }
    Ok(())
}

impl DocumentStore for FileDocumentStore {
    fn save(&self, id: &DocumentId, record: &DocumentRecord) -> Result<(), StorageError> {
        let path = self.path_for(id);
        let json = serde_json::to_string_pretty(record)?;

        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let written = file.write_all(json.as_bytes()).and_then(|_| file.sync_all());
        drop(file);
        discard_on_failure(&path, written)?;

        tracing::info!(
            doc_id = %id,
            sections = record.sections.len(),
            bytes = json.len(),
            "Document record stored"
        );
        Ok(())
    }

    fn load(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StorageError> {
        let raw = match std::fs::read_to_string(self.path_for(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }
}
