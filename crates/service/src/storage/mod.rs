//! Storage abstractions for the service layer
//!
//! `BookStorage` loads and saves the whole book document. The flat-file
//! backend is what the server runs on; the in-memory one backs tests and
//! embedders that do not want a file.

use async_trait::async_trait;

use crate::books::BookStore;
use crate::errors::ServiceError;

pub mod json_file_store;
pub mod in_memory;

pub use in_memory::InMemoryStorage;
pub use json_file_store::JsonFileStorage;

/// Whole-document persistence for the book store.
///
/// There is no partial read or write: every call moves the full document.
#[async_trait]
pub trait BookStorage: Send + Sync {
    /// Read and decode the full store. Missing or unreadable data is
    /// `ServiceError::Io`; malformed data is `ServiceError::Parse`.
    async fn load(&self) -> Result<BookStore, ServiceError>;

    /// Replace the persisted store with `store`.
    async fn save(&self, store: &BookStore) -> Result<(), ServiceError>;
}
