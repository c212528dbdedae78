use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::{ErrorBody, Health};

use crate::errors::ROUTE_NOT_FOUND;
use crate::state::AppState;

pub mod books;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Body for any path or method nothing else answers.
pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new(ROUTE_NOT_FOUND)))
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    // `/books/search` is a static segment, so it wins over `/books/:id`
    let book_routes = Router::new()
        .route("/books", get(books::list_books).post(books::create_book).fallback(not_found))
        .route("/books/search", get(books::search_books).fallback(not_found))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book)
                .fallback(not_found),
        );

    Router::new()
        .route("/health", get(health))
        .merge(book_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
