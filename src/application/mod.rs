pub mod book;
pub mod maintenance;
