//! Book repository: domain types, pure store operations, and the
//! storage-backed `BookService`.

pub mod domain;
pub mod ops;
pub mod service;

pub use domain::{Book, BookPatch, BookQuery, BookStore, NewBook, NewBookInput, SearchOutcome};
pub use service::BookService;
