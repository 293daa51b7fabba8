// src/feeds/sources/mod.rs
pub mod fixture;
pub mod http;

pub use fixture::FixtureSource;
pub use http::HttpSource;

use crate::error::FeedError;

/// Where a feed's body comes from.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw response body. Transport and non-2xx failures map to
    /// fetch-kind [`FeedError`]s.
    async fn fetch_body(&self) -> Result<String, FeedError>;

    /// Endpoint or label for logs.
    fn describe(&self) -> &str;
}
