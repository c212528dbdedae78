use std::sync::Arc;

use service::books::BookService;
use service::storage::BookStorage;

/// Shared handler state. The storage backend is chosen by whoever builds it.
#[derive(Clone)]
pub struct AppState {
    pub books: Arc<BookService>,
}

impl AppState {
    pub fn new(storage: Arc<dyn BookStorage>) -> Self {
        Self { books: Arc::new(BookService::new(storage)) }
    }
}
