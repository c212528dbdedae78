use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Number, Value};
use service::books::{Book, BookStore};
use service::errors::ServiceError;
use service::storage::{BookStorage, InMemoryStorage};
use tower::ServiceExt;

use server::{routes, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn dune() -> Book {
    Book { id: 1, title: "Dune".into(), author: "Herbert".into(), year: Number::from(1965) }
}

fn build_app(books: Vec<Book>) -> (Arc<InMemoryStorage>, Router) {
    let storage = Arc::new(InMemoryStorage::new(BookStore::new(books)));
    let app = routes::build_router(AppState::new(storage.clone()), cors());
    (storage, app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Backend whose file has gone bad.
struct CorruptStorage;

#[async_trait::async_trait]
impl BookStorage for CorruptStorage {
    async fn load(&self) -> Result<BookStore, ServiceError> {
        Err(ServiceError::Parse("expected value at line 1 column 1".into()))
    }
    async fn save(&self, _store: &BookStore) -> Result<(), ServiceError> {
        Err(ServiceError::Io("read-only file system".into()))
    }
}

#[tokio::test]
async fn create_assigns_next_id_and_is_retrievable() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![dune()]);

    let (status, body) = send(&app, "POST", "/books", Some(json!({"title": "Foo", "author": "Bar", "year": 2000}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 2, "title": "Foo", "author": "Bar", "year": 2000}));

    let (status, body) = send(&app, "GET", "/books/2", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Foo");
    Ok(())
}

#[tokio::test]
async fn create_on_empty_store_gets_id_one() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![]);
    let (status, body) = send(&app, "POST", "/books", Some(json!({"title": "A", "author": "B", "year": 1}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    Ok(())
}

#[tokio::test]
async fn create_with_missing_field_is_rejected_without_write() -> anyhow::Result<()> {
    let (storage, app) = build_app(vec![dune()]);
    let bodies = [
        json!({"author": "Bar", "year": 2000}),
        json!({"title": "Foo", "year": 2000}),
        json!({"title": "Foo", "author": "Bar"}),
        json!({"title": "", "author": "Bar", "year": 2000}),
        json!({"title": "Foo", "author": "Bar", "year": "two thousand"}),
        json!([1, 2, 3]),
    ];
    for b in bodies {
        let (status, body) = send(&app, "POST", "/books", Some(b)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Title, author, and year are required"}));
    }

    // no body at all
    let (status, _) = send(&app, "POST", "/books", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(storage.snapshot().await, BookStore::new(vec![dune()]));
    Ok(())
}

#[tokio::test]
async fn list_returns_all_in_order() -> anyhow::Result<()> {
    let second = Book { id: 2, title: "Emma".into(), author: "Austen".into(), year: Number::from(1815) };
    let (_storage, app) = build_app(vec![dune(), second]);
    let (status, body) = send(&app, "GET", "/books", None).await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body.as_array().unwrap().iter().map(|b| b["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, [1, 2]);
    Ok(())
}

#[tokio::test]
async fn get_unknown_or_malformed_id_is_404() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![dune()]);
    for uri in ["/books/99", "/books/abc", "/books/-1"] {
        let (status, body) = send(&app, "GET", uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({"error": "Book not found"}));
    }
    Ok(())
}

#[tokio::test]
async fn id_with_trailing_garbage_uses_its_numeric_prefix() -> anyhow::Result<()> {
    let (storage, app) = build_app(vec![dune()]);
    for uri in ["/books/1abc", "/books/1.9"] {
        let (status, body) = send(&app, "GET", uri, None).await?;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["title"], "Dune");
    }

    let (status, body) = send(&app, "DELETE", "/books/1xyz", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Book with id 1 deleted"}));
    assert!(storage.snapshot().await.books.is_empty());
    Ok(())
}

#[tokio::test]
async fn fractional_years_round_trip_through_the_api() -> anyhow::Result<()> {
    let (storage, app) = build_app(vec![]);

    let (status, body) = send(&app, "POST", "/books", Some(json!({"title": "Foo", "author": "Bar", "year": 2000.5}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"id": 1, "title": "Foo", "author": "Bar", "year": 2000.5}));

    let (status, body) = send(&app, "PUT", "/books/1", Some(json!({"year": 1999.0}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"].as_f64(), Some(1999.0));
    assert_eq!(storage.snapshot().await.books[0].year.as_f64(), Some(1999.0));

    // 0.0 is as falsy as 0
    let (status, _) = send(&app, "POST", "/books", Some(json!({"title": "Foo", "author": "Bar", "year": 0.0}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_past_the_largest_id_is_a_500() -> anyhow::Result<()> {
    let top = Book { id: u64::MAX, ..dune() };
    let (storage, app) = build_app(vec![top.clone()]);
    let (status, body) = send(&app, "POST", "/books", Some(json!({"title": "Foo", "author": "Bar", "year": 2000}))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Internal server error"}));
    assert_eq!(storage.snapshot().await, BookStore::new(vec![top]));
    Ok(())
}

#[tokio::test]
async fn update_requires_a_field_and_patches_only_that_field() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![dune()]);

    let (status, body) = send(&app, "PUT", "/books/1", Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "At least one of title, author, or year is required to update"}));

    // falsy values count as absent
    let (status, _) = send(&app, "PUT", "/books/1", Some(json!({"title": "", "year": 0}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "PUT", "/books/1", Some(json!({"year": 1966, "title": ""}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 1, "title": "Dune", "author": "Herbert", "year": 1966}));

    let (status, body) = send(&app, "PUT", "/books/7", Some(json!({"title": "X"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));

    // validation wins over an unparseable id
    let (status, _) = send(&app, "PUT", "/books/abc", Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "PUT", "/books/abc", Some(json!({"title": "X"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_twice_returns_404_second_time() -> anyhow::Result<()> {
    let (storage, app) = build_app(vec![dune()]);

    let (status, body) = send(&app, "DELETE", "/books/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Book with id 1 deleted"}));
    assert!(storage.snapshot().await.books.is_empty());

    let (status, body) = send(&app, "DELETE", "/books/1", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Book not found"}));
    Ok(())
}

#[tokio::test]
async fn search_matches_case_insensitively() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![
        dune(),
        Book { id: 2, title: "War and Peace".into(), author: "Tolstoy".into(), year: Number::from(1869) },
        Book { id: 3, title: "The Art of WAR".into(), author: "Sun Tzu".into(), year: Number::from(-500) },
    ]);

    let (status, body) = send(&app, "GET", "/books/search?title=war", None).await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body.as_array().unwrap().iter().map(|b| b["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, [2, 3]);

    let (status, body) = send(&app, "GET", "/books/search?title=war&author=tolstoy", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/books/search?author=austen", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No books found"}));

    for uri in ["/books/search", "/books/search?title=&author="] {
        let (status, body) = send(&app, "GET", uri, None).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "At least one query parameter ('author' or 'title') is required"}));
    }
    Ok(())
}

#[tokio::test]
async fn unknown_routes_and_methods_fall_back_to_404() -> anyhow::Result<()> {
    let (_storage, app) = build_app(vec![dune()]);
    for (method, uri) in [("GET", "/authors"), ("PATCH", "/books/1"), ("DELETE", "/books"), ("POST", "/books/search")] {
        let (status, body) = send(&app, method, uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body, json!({"error": "404 Not Found"}));
    }

    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn storage_failures_are_generic_500s() -> anyhow::Result<()> {
    let app = routes::build_router(AppState::new(Arc::new(CorruptStorage)), cors());
    let expected = json!({"error": "Internal server error"});

    for (method, uri, body) in [
        ("GET", "/books", None),
        ("GET", "/books/1", None),
        ("DELETE", "/books/1", None),
        ("GET", "/books/search?title=x", None),
        ("POST", "/books", Some(json!({"title": "Foo", "author": "Bar", "year": 2000}))),
        ("PUT", "/books/1", Some(json!({"title": "Foo"}))),
    ] {
        let (status, got) = send(&app, method, uri, body).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(got, expected);
    }
    Ok(())
}
