pub mod book_store;
pub mod number_provider;
pub mod pending_queue;

pub use book_store::{BookStore, InsertOutcome, UpdateOutcome};
pub use number_provider::NumberProvider;
pub use pending_queue::{PendingEntry, PendingQueue};
