// src/error.rs
//! Failure taxonomy for one feed refresh cycle.
//!
//! Both kinds are contained by the poller that produced them: the previous
//! snapshot stays published and the message is surfaced in `FeedState::error`.
//! Individual unparsable numeric fields are not errors at all, they coerce to 0.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Remote answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    /// Connection, TLS, redirect or body-read failure.
    #[error("fetch failed: {0}")]
    Transport(String),

    /// Body is not JSON, or not a list of record objects after unwrapping.
    #[error("{0}")]
    Malformed(String),
}

impl FeedError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// True for transport/HTTP-status failures (`FetchError` family).
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport(_))
    }

    /// Short label used in metrics and logs.
    pub fn kind(&self) -> &'static str {
        if self.is_fetch() {
            "fetch"
        } else {
            "malformed"
        }
    }
}
