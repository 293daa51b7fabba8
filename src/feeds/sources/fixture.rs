// src/feeds/sources/fixture.rs
use async_trait::async_trait;

use super::FeedSource;
use crate::error::FeedError;

/// Serves a fixed body. Used by tests and the offline probe.
pub struct FixtureSource {
    body: String,
}

impl FixtureSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl FeedSource for FixtureSource {
    async fn fetch_body(&self) -> Result<String, FeedError> {
        Ok(self.body.clone())
    }

    fn describe(&self) -> &str {
        "fixture"
    }
}
