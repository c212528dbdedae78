use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookStorage;
use crate::books::BookStore;
use crate::errors::ServiceError;

/// Keeps the document in memory. Never fails.
#[derive(Default)]
pub struct InMemoryStorage {
    inner: RwLock<BookStore>,
}

impl InMemoryStorage {
    pub fn new(store: BookStore) -> Self {
        Self { inner: RwLock::new(store) }
    }

    /// Copy of the current document.
    pub async fn snapshot(&self) -> BookStore {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl BookStorage for InMemoryStorage {
    async fn load(&self) -> Result<BookStore, ServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, store: &BookStore) -> Result<(), ServiceError> {
        *self.inner.write().await = store.clone();
        Ok(())
    }
}
