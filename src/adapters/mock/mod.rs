pub mod book_store;
pub mod number_provider;

pub use book_store::BookStore;
pub use number_provider::NumberProvider;
