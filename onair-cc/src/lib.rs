//! # OnAir Companion Client
//!
//! Client-side logic for the live-radio companion experience: the chat view
//! merge (optimistic inserts reconciled against broadcast echoes), reaction
//! overlays, mention highlighting, and the activity feed poller with its
//! bounded ring buffer. UI shells drive these types; nothing here renders.

pub mod chat;
pub mod client;
pub mod feed;

pub use client::{ApiClient, ClientError};
