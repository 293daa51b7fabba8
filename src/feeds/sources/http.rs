// src/feeds/sources/http.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::FeedSource;
use crate::error::FeedError;

/// Plain `GET` against a JSON endpoint, no auth.
#[derive(Clone)]
pub struct HttpSource {
    url: String,
    client: Client,
    timeout: Option<Duration>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
            timeout: None,
        }
    }

    /// Per-request timeout. Without one a hung request keeps the feed loading.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    async fn fetch_body(&self) -> Result<String, FeedError> {
        let mut req = self.client.get(&self.url);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        resp.text()
            .await
            .map_err(|e| FeedError::Transport(format!("reading body: {e}")))
    }

    fn describe(&self) -> &str {
        &self.url
    }
}
