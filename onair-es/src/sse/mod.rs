//! Server-Sent Events fan-out for chat and milestone broadcast

mod broadcaster;

pub use broadcaster::SseBroadcaster;
