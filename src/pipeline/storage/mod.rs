pub mod document_store;

pub use document_store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),
}
