use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::errors::ServiceError;

pub const CREATE_FIELDS_REQUIRED: &str = "Title, author, and year are required";
pub const UPDATE_FIELD_REQUIRED: &str = "At least one of title, author, or year is required to update";
pub const SEARCH_PARAM_REQUIRED: &str = "At least one query parameter ('author' or 'title') is required";

/// A single book record as persisted and returned over HTTP.
///
/// `year` is any JSON number and is written back exactly as it was read, so
/// `1965` stays an integer and `1965.0` stays a float.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub year: Number,
}

/// The whole persisted document: `{ "books": [...] }`.
///
/// Order is insertion order; nothing else sorts it.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookStore {
    pub books: Vec<Book>,
}

impl BookStore {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }
}

/// Create request body. Every field is optional on the wire so that a missing
/// field is reported as a validation error rather than a decode error.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<Number>,
}

/// A create request that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: Number,
}

impl NewBookInput {
    /// All three fields must be present and non-empty (year non-zero).
    pub fn validate(self) -> Result<NewBook, ServiceError> {
        match (non_empty(self.title), non_empty(self.author), non_zero(self.year)) {
            (Some(title), Some(author), Some(year)) => Ok(NewBook { title, author, year }),
            _ => Err(ServiceError::Validation(CREATE_FIELDS_REQUIRED.into())),
        }
    }
}

/// Partial update body. Empty strings and a zero year count as absent.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<Number>,
}

impl BookPatch {
    /// Drop empty values and require that something is left.
    pub fn validate(self) -> Result<BookPatch, ServiceError> {
        let patch = BookPatch {
            title: non_empty(self.title),
            author: non_empty(self.author),
            year: non_zero(self.year),
        };
        if patch.is_empty() {
            return Err(ServiceError::Validation(UPDATE_FIELD_REQUIRED.into()));
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }

    /// Overwrite the fields this patch carries.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(year) = &self.year {
            book.year = year.clone();
        }
    }
}

/// `?author=&title=` search parameters.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BookQuery {
    pub author: Option<String>,
    pub title: Option<String>,
}

impl BookQuery {
    pub fn validate(self) -> Result<BookQuery, ServiceError> {
        let query = BookQuery { author: non_empty(self.author), title: non_empty(self.title) };
        if query.author.is_none() && query.title.is_none() {
            return Err(ServiceError::Validation(SEARCH_PARAM_REQUIRED.into()));
        }
        Ok(query)
    }

    /// Case-insensitive substring match on every provided field.
    pub fn matches(&self, book: &Book) -> bool {
        contains_ci(&book.author, self.author.as_deref()) && contains_ci(&book.title, self.title.as_deref())
    }
}

/// Result of a search. An empty result is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<Book>),
    NoResults,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

/// `0`, `-0` and `0.0` are all zero.
fn non_zero(v: Option<Number>) -> Option<Number> {
    v.filter(|y| y.as_f64().map_or(true, |f| f != 0.0))
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
        None => true,
    }
}
