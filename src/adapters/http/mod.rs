pub mod number_client;

pub use number_client::HttpNumberClient;
