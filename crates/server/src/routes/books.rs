use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::types::MessageBody;
use service::books::{
    domain::{CREATE_FIELDS_REQUIRED, SEARCH_PARAM_REQUIRED, UPDATE_FIELD_REQUIRED},
    Book, BookPatch, BookQuery, NewBookInput, SearchOutcome,
};
use tracing::debug;

use crate::errors::ApiError;
use crate::state::AppState;

const NO_BOOKS_FOUND: &str = "No books found";

/// Reads an id with `parseInt` rules: leading whitespace and a sign are
/// skipped, then the longest run of digits is taken and the rest ignored, so
/// `/books/2abc` is book 2. A `0x` prefix switches to hexadecimal. Input with
/// no leading digits, or a negative value, cannot match any record.
fn parse_id(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, s) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        _ => (10, s),
    };
    let end = s.find(|c: char| !c.is_digit(radix)).unwrap_or(s.len());
    let value = u64::from_str_radix(&s[..end], radix).ok()?;
    // -0 is still 0
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

/// A body axum cannot decode counts as missing fields.
fn body_or_bad_request<T>(payload: Result<Json<T>, JsonRejection>, msg: &str) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|e| {
        debug!(rejection = %e, "request body rejected");
        ApiError::BadRequest(msg.to_string())
    })
}

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<NewBookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let input = body_or_bad_request(payload, CREATE_FIELDS_REQUIRED)?;
    let book = state.books.create(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /books
pub async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books.list().await?))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound)?;
    Ok(Json(state.books.get(id).await?))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let patch = body_or_bad_request(payload, UPDATE_FIELD_REQUIRED)?;
    let Some(id) = parse_id(&raw_id) else {
        // an empty patch is still a 400 before any lookup
        patch.validate()?;
        return Err(ApiError::NotFound);
    };
    Ok(Json(state.books.update(id, patch).await?))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_id(&raw_id).ok_or(ApiError::NotFound)?;
    let removed = state.books.delete(id).await?;
    Ok(Json(MessageBody::new(format!("Book with id {} deleted", removed.id))))
}

/// GET /books/search?author=&title=
pub async fn search_books(
    State(state): State<AppState>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        debug!(rejection = %e, "search query rejected");
        ApiError::BadRequest(SEARCH_PARAM_REQUIRED.to_string())
    })?;
    match state.books.search(query).await? {
        SearchOutcome::Found(books) => Ok(Json(books).into_response()),
        SearchOutcome::NoResults => {
            Ok((StatusCode::NOT_FOUND, Json(MessageBody::new(NO_BOOKS_FOUND))).into_response())
        }
    }
}
