//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server prepares the book store
//! file without knowing its on-disk format.

use std::path::Path;

use crate::storage::JsonFileStorage;

/// Ensure the store file's directory exists and seed an empty store document
/// if the file is missing and `create_if_missing` is set.
pub async fn ensure_store_file(path: &Path, create_if_missing: bool) -> anyhow::Result<bool> {
    let seed = JsonFileStorage::empty_document()?;
    common::env::ensure_data_file(path, &seed, create_if_missing).await
}
