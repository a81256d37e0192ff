pub mod models;
pub mod timestamp;
