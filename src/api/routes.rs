//! API route configuration.

use crate::api::handlers::{
    create_book_handler, delete_book_handler, get_book_handler, list_books_handler,
    update_book_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Book routes, nested under `/v1` by [`crate::routes::app_router`].
///
/// # Endpoints
///
/// - `POST   /books`        - Create a book
/// - `GET    /books`        - List books (`?page=&size=`)
/// - `PUT    /books`        - Update a book (id in body)
/// - `GET    /books/{id}`   - Fetch one book
/// - `DELETE /books/{id}`   - Soft-delete a book
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            post(create_book_handler)
                .get(list_books_handler)
                .put(update_book_handler),
        )
        .route(
            "/books/{id}",
            get(get_book_handler).delete(delete_book_handler),
        )
}
