pub mod file;
pub mod http;
pub mod mock;
pub mod postgres;
