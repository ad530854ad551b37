//! Handlers for the book endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::book::{BookResponse, CreateBookRequest, UpdateBookRequest};
use crate::api::dto::pagination::{ListBooksQuery, PaginatedResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a book.
///
/// # Endpoint
///
/// `POST /v1/books`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Dune",
///   "author": "Frank Herbert",
///   "description": "Desert planet",
///   "published_date": "1965-08-01"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is not valid JSON.
pub async fn create_book_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(payload) = payload?;

    let book = state.book_service.create(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Lists books, newest first.
///
/// # Endpoint
///
/// `GET /v1/books?page=1&size=10`
///
/// # Response
///
/// ```json
/// { "data": [...], "page": 1, "size": 10, "total_pages": 3 }
/// ```
pub async fn list_books_handler(
    State(state): State<AppState>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<PaginatedResponse<BookResponse>>, AppError> {
    let Query(query) = query?;
    let (page, size) = query.resolve();

    let (books, total) = state.book_service.list_with_total(page, size).await?;

    Ok(Json(PaginatedResponse::new(
        books.into_iter().map(BookResponse::from).collect(),
        page,
        size,
        total,
    )))
}

/// Returns one book.
///
/// # Endpoint
///
/// `GET /v1/books/{id}`
///
/// # Errors
///
/// - 400 if `id` is not an integer
/// - 404 if no live book has this id
pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, AppError> {
    let id = parse_id(&id)?;

    let book = state.book_service.get(id).await?;

    Ok(Json(book.into()))
}

/// Partially updates a book. Empty or absent fields keep their value.
///
/// # Endpoint
///
/// `PUT /v1/books`
pub async fn update_book_handler(
    State(state): State<AppState>,
    payload: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Json(payload) = payload?;
    let (id, changes) = payload.into_changes();

    let book = state.book_service.update(id, changes).await?;

    Ok(Json(book.into()))
}

/// Soft-deletes a book.
///
/// # Endpoint
///
/// `DELETE /v1/books/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: deleted
/// - **404 Not Found**: missing or already deleted
pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;

    state.book_service.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::bad_request("ID param is invalid", json!({ "id": raw })))
}
