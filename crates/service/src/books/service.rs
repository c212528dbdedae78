use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::storage::BookStorage;

use super::domain::{Book, BookPatch, BookQuery, NewBookInput, SearchOutcome};
use super::ops;

/// Application service for books.
///
/// Each call loads the whole store from the injected backend, runs one of the
/// pure operations in [`ops`], and saves the store again if it changed.
/// Mutations hold `write_lock` across load/mutate/save so two requests in this
/// process cannot overwrite each other's changes. Other processes sharing the
/// same file are not coordinated.
pub struct BookService {
    storage: Arc<dyn BookStorage>,
    write_lock: Mutex<()>,
}

impl BookService {
    pub fn new(storage: Arc<dyn BookStorage>) -> Self {
        Self { storage, write_lock: Mutex::new(()) }
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewBookInput) -> Result<Book, ServiceError> {
        let new = input.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut store = self.storage.load().await?;
        let book = ops::create(&mut store, new)?;
        self.storage.save(&store).await?;
        info!(event = "book_created", id = book.id, "book created");
        Ok(book)
    }

    pub async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        let store = self.storage.load().await?;
        Ok(ops::list(&store).to_vec())
    }

    pub async fn get(&self, id: u64) -> Result<Book, ServiceError> {
        let store = self.storage.load().await?;
        ops::get_by_id(&store, id).cloned()
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: BookPatch) -> Result<Book, ServiceError> {
        let patch = patch.validate()?;
        let _guard = self.write_lock.lock().await;
        let mut store = self.storage.load().await?;
        let book = ops::update(&mut store, id, &patch)?;
        self.storage.save(&store).await?;
        info!(event = "book_updated", id, "book updated");
        Ok(book)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<Book, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.storage.load().await?;
        let removed = ops::delete(&mut store, id)?;
        self.storage.save(&store).await?;
        info!(event = "book_deleted", id, "book deleted");
        Ok(removed)
    }

    pub async fn search(&self, query: BookQuery) -> Result<SearchOutcome, ServiceError> {
        let query = query.validate()?;
        let store = self.storage.load().await?;
        Ok(ops::search(&store, &query))
    }
}
