use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::BookStorage;
use crate::books::BookStore;
use crate::errors::ServiceError;

/// Flat JSON file backend.
///
/// The file is re-read on every `load`; nothing is cached. `save` overwrites
/// the file in place with pretty-printed JSON.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    file_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Bytes of an empty store document, used to seed a fresh file.
    pub fn empty_document() -> Result<Vec<u8>, ServiceError> {
        Ok(serde_json::to_vec_pretty(&BookStore::default())?)
    }
}

#[async_trait]
impl BookStorage for JsonFileStorage {
    async fn load(&self) -> Result<BookStore, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", self.file_path.display())))?;
        let store: BookStore = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Parse(format!("{}: {e}", self.file_path.display())))?;
        debug!(path = %self.file_path.display(), count = store.books.len(), "store loaded");
        Ok(store)
    }

    async fn save(&self, store: &BookStore) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(store)?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Io(format!("{}: {e}", self.file_path.display())))?;
        debug!(path = %self.file_path.display(), count = store.books.len(), "store saved");
        Ok(())
    }
}
