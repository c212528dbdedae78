//! Service layer providing the book repository on top of a pluggable storage
//! backend.
//! - `books` holds the domain types, the pure store operations and `BookService`.
//! - `storage` holds the `BookStorage` trait and its file/in-memory backends.

pub mod errors;
pub mod books;
pub mod storage;
pub mod runtime;
