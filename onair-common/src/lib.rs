//! # OnAir Common Library
//!
//! Shared code for the OnAir listener engagement services including:
//! - Database models and initialization
//! - Engagement event types (EngagementEvent enum)
//! - API request/response types
//! - Configuration loading and root folder resolution
//! - Guest identity derivation

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod identity;
pub mod time;

pub use error::{Error, Result};
