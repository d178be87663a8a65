pub mod pending_queue;

pub use pending_queue::PendingQueue as FilePendingQueue;
