//! HTTP API handlers for onair-es

pub mod chat;
pub mod error;
pub mod feed;
pub mod health;
pub mod identity;
pub mod leaderboard;
pub mod likes;
pub mod listeners;
pub mod sse;

pub use error::ApiError;
