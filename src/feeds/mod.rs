// src/feeds/mod.rs
//! Feed poller: fetch → parse → unwrap → normalize → publish, one feed at a time.
//!
//! Each poller is the single writer of its `FeedState`, kept in a
//! `tokio::sync::watch` cell. Readers get cheap clones (the snapshot sits
//! behind an `Arc`) or subscribe to changes. A failed cycle keeps the last
//! good snapshot and only sets `error`.

pub mod sources;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::FeedError;
use crate::schema::{normalize_body, NormalizedRecord};
use sources::FeedSource;

/// One-time metrics registration (so series show up on /metrics). Runs
/// from `Metrics::init` once the recorder is installed.
pub(crate) fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_refresh_total", "Completed feed refresh cycles.");
        describe_counter!(
            "feed_refresh_errors_total",
            "Feed refresh cycles that ended in a fetch or format error."
        );
        describe_histogram!("feed_fetch_ms", "Fetch + normalize time in milliseconds.");
        describe_gauge!(
            "feed_last_success_ts",
            "Unix ts of the last published snapshot."
        );
        describe_gauge!("feed_records", "Records in the current snapshot.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedId {
    Nbd,
    Inventory,
}

impl FeedId {
    pub const ALL: [FeedId; 2] = [FeedId::Nbd, FeedId::Inventory];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedId::Nbd => "nbd",
            FeedId::Inventory => "inventory",
        }
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nbd" => Ok(FeedId::Nbd),
            "inventory" | "inv" => Ok(FeedId::Inventory),
            other => Err(format!("unknown feed `{other}`")),
        }
    }
}

/// Result of one successful cycle. Never mutated after publish.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot<R> {
    pub records: Vec<R>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedState<R> {
    pub snapshot: Option<Arc<FeedSnapshot<R>>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<R> FeedState<R> {
    /// Process-start state: nothing fetched yet, first load pending.
    pub fn initial() -> Self {
        Self {
            snapshot: None,
            loading: true,
            error: None,
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.as_ref().map(|s| s.fetched_at)
    }

    pub fn records(&self) -> &[R] {
        self.snapshot
            .as_ref()
            .map(|s| s.records.as_slice())
            .unwrap_or(&[])
    }
}

impl<R> Default for FeedState<R> {
    fn default() -> Self {
        Self::initial()
    }
}

pub struct FeedPoller<R: NormalizedRecord> {
    id: FeedId,
    source: Box<dyn FeedSource>,
    state: watch::Sender<FeedState<R>>,
    in_flight: AtomicUsize,
}

impl<R: NormalizedRecord> FeedPoller<R> {
    pub fn new(id: FeedId, source: impl FeedSource + 'static) -> Self {
        let (state, _) = watch::channel(FeedState::initial());
        Self {
            id,
            source: Box::new(source),
            state,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> FeedId {
        self.id
    }

    /// Current state (cheap clone).
    pub fn state(&self) -> FeedState<R> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState<R>> {
        self.state.subscribe()
    }

    /// Run one cycle. Overlapping calls are allowed; whichever completes
    /// last decides the published snapshot/error, and `loading` stays set
    /// while any call is still in flight.
    ///
    /// Dropping the returned future mid-fetch abandons the cycle: the
    /// previous snapshot and error stay, and `loading` is settled as if the
    /// call had returned.
    pub async fn refresh(&self) -> Result<Arc<FeedSnapshot<R>>, FeedError> {
        let feed = self.id.as_str();
        let cycle = InFlight::enter(self);

        let t0 = Instant::now();
        let outcome = self.fetch_and_normalize().await;
        histogram!("feed_fetch_ms", "feed" => feed).record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("feed_refresh_total", "feed" => feed).increment(1);

        match outcome {
            Ok(records) => {
                let snapshot = Arc::new(FeedSnapshot {
                    records,
                    fetched_at: Utc::now(),
                });
                cycle.publish(|s| {
                    s.snapshot = Some(Arc::clone(&snapshot));
                    s.error = None;
                });

                gauge!("feed_last_success_ts", "feed" => feed)
                    .set(snapshot.fetched_at.timestamp() as f64);
                gauge!("feed_records", "feed" => feed).set(snapshot.records.len() as f64);
                tracing::info!(
                    target: "feeds",
                    feed,
                    kind = R::KIND,
                    records = snapshot.records.len(),
                    "feed refreshed"
                );
                Ok(snapshot)
            }
            Err(e) => {
                let message = e.to_string();
                cycle.publish(|s| s.error = Some(message.clone()));

                counter!("feed_refresh_errors_total", "feed" => feed, "kind" => e.kind())
                    .increment(1);
                tracing::warn!(
                    target: "feeds",
                    feed,
                    source = self.source.describe(),
                    error = %e,
                    "feed refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn fetch_and_normalize(&self) -> Result<Vec<R>, FeedError> {
        let body = self.source.fetch_body().await?;
        normalize_body(&body)
    }

    /// Apply the end-of-cycle update and settle `loading` in the same step.
    fn settle(&self, update: impl FnOnce(&mut FeedState<R>)) {
        self.state.send_modify(|s| {
            update(s);
            let still_running = self.in_flight.fetch_sub(1, Ordering::SeqCst) > 1;
            s.loading = still_running;
        });
    }
}

/// One running refresh cycle. Holds a slot in `in_flight` until it either
/// publishes or is dropped.
struct InFlight<'a, R: NormalizedRecord> {
    poller: &'a FeedPoller<R>,
    settled: bool,
}

impl<'a, R: NormalizedRecord> InFlight<'a, R> {
    fn enter(poller: &'a FeedPoller<R>) -> Self {
        poller.in_flight.fetch_add(1, Ordering::SeqCst);
        poller.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        Self {
            poller,
            settled: false,
        }
    }

    fn publish(mut self, update: impl FnOnce(&mut FeedState<R>)) {
        self.settled = true;
        self.poller.settle(update);
    }
}

impl<R: NormalizedRecord> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!(
            target: "feeds",
            feed = self.poller.id.as_str(),
            "refresh abandoned before completion"
        );
        self.poller.settle(|_| {});
    }
}
