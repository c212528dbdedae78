//! Pure operations over an in-memory [`BookStore`]. No I/O happens here; the
//! caller loads the store beforehand and persists it afterwards.

use crate::errors::ServiceError;

use super::domain::{Book, BookPatch, BookQuery, BookStore, NewBook, SearchOutcome};

const BOOK: &str = "book";

/// Next id is one past the highest id currently stored, or 1 for an empty
/// store. Deleting the highest record makes its id available again.
pub fn next_id(store: &BookStore) -> Result<u64, ServiceError> {
    match store.books.iter().map(|b| b.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(ServiceError::IdExhausted(max)),
    }
}

pub fn create(store: &mut BookStore, new: NewBook) -> Result<Book, ServiceError> {
    let book = Book { id: next_id(store)?, title: new.title, author: new.author, year: new.year };
    store.books.push(book.clone());
    Ok(book)
}

pub fn list(store: &BookStore) -> &[Book] {
    &store.books
}

pub fn get_by_id(store: &BookStore, id: u64) -> Result<&Book, ServiceError> {
    store.books.iter().find(|b| b.id == id).ok_or_else(|| ServiceError::not_found(BOOK))
}

pub fn update(store: &mut BookStore, id: u64, patch: &BookPatch) -> Result<Book, ServiceError> {
    let book = store
        .books
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| ServiceError::not_found(BOOK))?;
    patch.apply_to(book);
    Ok(book.clone())
}

/// Remove the first record with `id`, returning it.
pub fn delete(store: &mut BookStore, id: u64) -> Result<Book, ServiceError> {
    let index = store
        .books
        .iter()
        .position(|b| b.id == id)
        .ok_or_else(|| ServiceError::not_found(BOOK))?;
    Ok(store.books.remove(index))
}

pub fn search(store: &BookStore, query: &BookQuery) -> SearchOutcome {
    let hits: Vec<Book> = store.books.iter().filter(|b| query.matches(b)).cloned().collect();
    if hits.is_empty() {
        SearchOutcome::NoResults
    } else {
        SearchOutcome::Found(hits)
    }
}
