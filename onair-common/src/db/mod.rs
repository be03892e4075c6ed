//! Database access layer shared by OnAir services

pub mod init;
pub mod models;

pub use init::{init_database, init_database_url, init_memory_database};
