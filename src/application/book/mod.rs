mod book_service;
mod catalog;
mod errors;
mod metrics;

pub use book_service::{
    DEFAULT_NUMBER_TIMEOUT, RegistrationOutcome, ServiceDependencies, register_book,
};
pub use catalog::{
    count_books, delete_book, find_book, find_pending_books, find_random_book, list_books,
    update_book,
};
pub use errors::{BookApplicationError, Result};
pub use metrics::BookMetrics;
