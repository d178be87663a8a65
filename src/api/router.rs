use axum::{
    Router, middleware,
    routing::{get, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, count_books, create_book, delete_book, get_book_by_id, get_maintenance_status,
    get_random_book, list_books, list_pending_books, publish_config_change, update_book,
};
use super::maintenance::check_maintenance;

/// Creates the API router with all book endpoints
///
/// Protected by the maintenance gate (503 while closed):
/// - GET/POST/PUT /books
/// - GET /books/count, /books/random, /books/pending
/// - GET/DELETE /books/:id
///
/// Always available:
/// - GET /health
/// - GET /maintenance - current gate state
/// - PUT /maintenance/config - publish a configuration change
pub fn create_router(state: Arc<AppState>) -> Router {
    let books = Router::new()
        .route("/books", get(list_books).post(create_book).put(update_book))
        .route("/books/count", get(count_books))
        .route("/books/random", get(get_random_book))
        .route("/books/pending", get(list_pending_books))
        .route("/books/:id", get(get_book_by_id).delete(delete_book))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            check_maintenance,
        ));

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Maintenance administration (not gated)
        .route("/maintenance", get(get_maintenance_status))
        .route("/maintenance/config", put(publish_config_change))
        .merge(books)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
