// src/dashboard.rs
//! Core → presentation facade.
//!
//! Owns both feed pollers and the view rotation. The presentation layer only
//! reads through these accessors (or subscribes) and forwards manual toggles;
//! it never writes core state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::config::DashboardConfig;
use crate::derived::{Derive, DerivedMetrics};
use crate::error::FeedError;
use crate::feeds::sources::{FeedSource, HttpSource};
use crate::feeds::{FeedId, FeedPoller, FeedState};
use crate::liveness;
use crate::rotation::{Countdown, Rotation, RotationState, ViewId, COUNTDOWN_CADENCE};
use crate::schema::{InventoryRecord, NormalizedRecord, ProgressRecord};

/// Either feed's state, as handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnyFeedState {
    Nbd(FeedState<ProgressRecord>),
    Inventory(FeedState<InventoryRecord>),
}

impl AnyFeedState {
    pub fn loading(&self) -> bool {
        match self {
            AnyFeedState::Nbd(s) => s.loading,
            AnyFeedState::Inventory(s) => s.loading,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnyFeedState::Nbd(s) => s.error.as_deref(),
            AnyFeedState::Inventory(s) => s.error.as_deref(),
        }
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AnyFeedState::Nbd(s) => s.fetched_at(),
            AnyFeedState::Inventory(s) => s.fetched_at(),
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            AnyFeedState::Nbd(s) => s.records().len(),
            AnyFeedState::Inventory(s) => s.records().len(),
        }
    }
}

/// Per-feed summary for the header.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOverview {
    pub feed: FeedId,
    pub loading: bool,
    pub error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub records: usize,
    pub live: bool,
    pub metrics: Option<DerivedMetrics>,
}

/// Everything a header render needs, read at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub active_view: ViewId,
    pub next_switch_at: DateTime<Utc>,
    pub countdown: Countdown,
    pub countdown_cadence_ms: u64,
    pub nbd: FeedOverview,
    pub inventory: FeedOverview,
}

pub struct Dashboard {
    nbd: FeedPoller<ProgressRecord>,
    inventory: FeedPoller<InventoryRecord>,
    rotation: Rotation,
    liveness_window: TimeDelta,
}

impl Dashboard {
    pub fn new(
        nbd: FeedPoller<ProgressRecord>,
        inventory: FeedPoller<InventoryRecord>,
        rotation: Rotation,
        liveness_window: Duration,
    ) -> Self {
        Self {
            nbd,
            inventory,
            rotation,
            liveness_window: liveness::window_from(liveness_window),
        }
    }

    /// Wire pollers from two sources with the given rotation period.
    pub fn with_sources(
        nbd: impl FeedSource + 'static,
        inventory: impl FeedSource + 'static,
        rotation_period: Duration,
        liveness_window: Duration,
    ) -> Self {
        Self::new(
            FeedPoller::new(FeedId::Nbd, nbd),
            FeedPoller::new(FeedId::Inventory, inventory),
            Rotation::new(rotation_period),
            liveness_window,
        )
    }

    /// HTTP-backed dashboard from a validated config.
    pub fn from_config(cfg: &DashboardConfig) -> Self {
        let client = reqwest::Client::new();
        let source = |url: &str| {
            let s = HttpSource::with_client(url, client.clone());
            match cfg.fetch_timeout() {
                Some(t) => s.with_timeout(t),
                None => s,
            }
        };
        Self::with_sources(
            source(&cfg.nbd_url),
            source(&cfg.inventory_url),
            cfg.rotation_period(),
            cfg.liveness_window(),
        )
    }

    pub fn nbd(&self) -> &FeedPoller<ProgressRecord> {
        &self.nbd
    }

    pub fn inventory(&self) -> &FeedPoller<InventoryRecord> {
        &self.inventory
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn active_view(&self) -> ViewId {
        self.rotation.active_view()
    }

    pub fn rotation_state(&self) -> RotationState {
        self.rotation.current()
    }

    pub fn feed_state(&self, feed: FeedId) -> AnyFeedState {
        match feed {
            FeedId::Nbd => AnyFeedState::Nbd(self.nbd.state()),
            FeedId::Inventory => AnyFeedState::Inventory(self.inventory.state()),
        }
    }

    /// Metrics of the latest snapshot; `None` until one was published.
    pub fn derived_metrics(&self, feed: FeedId) -> Option<DerivedMetrics> {
        match feed {
            FeedId::Nbd => derive_from(&self.nbd.state()),
            FeedId::Inventory => derive_from(&self.inventory.state()),
        }
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown_at(Utc::now())
    }

    pub fn countdown_at(&self, now: DateTime<Utc>) -> Countdown {
        self.rotation.countdown(now)
    }

    pub fn request_manual_toggle(&self) -> RotationState {
        self.request_manual_toggle_at(Utc::now())
    }

    pub fn request_manual_toggle_at(&self, now: DateTime<Utc>) -> RotationState {
        self.rotation.toggle(now)
    }

    pub fn is_live(&self, feed: FeedId) -> bool {
        self.is_live_at(feed, Utc::now())
    }

    pub fn is_live_at(&self, feed: FeedId, now: DateTime<Utc>) -> bool {
        match feed {
            FeedId::Nbd => liveness::is_live(&self.nbd.state(), now, self.liveness_window),
            FeedId::Inventory => {
                liveness::is_live(&self.inventory.state(), now, self.liveness_window)
            }
        }
    }

    /// Run one refresh cycle of a feed. The error is already recorded in
    /// the feed state; it is returned for callers that want to report it.
    pub async fn refresh(&self, feed: FeedId) -> Result<(), FeedError> {
        match feed {
            FeedId::Nbd => self.nbd.refresh().await.map(|_| ()),
            FeedId::Inventory => self.inventory.refresh().await.map(|_| ()),
        }
    }

    pub fn subscribe_rotation(&self) -> watch::Receiver<RotationState> {
        self.rotation.subscribe()
    }

    pub fn subscribe_nbd(&self) -> watch::Receiver<FeedState<ProgressRecord>> {
        self.nbd.subscribe()
    }

    pub fn subscribe_inventory(&self) -> watch::Receiver<FeedState<InventoryRecord>> {
        self.inventory.subscribe()
    }

    pub fn overview(&self) -> Overview {
        self.overview_at(Utc::now())
    }

    pub fn overview_at(&self, now: DateTime<Utc>) -> Overview {
        let rotation = self.rotation.current();
        Overview {
            active_view: rotation.active_view,
            next_switch_at: rotation.next_switch_at,
            countdown: rotation.countdown(now, self.rotation.period()),
            countdown_cadence_ms: COUNTDOWN_CADENCE.as_millis() as u64,
            nbd: self.feed_overview(FeedId::Nbd, now),
            inventory: self.feed_overview(FeedId::Inventory, now),
        }
    }

    fn feed_overview(&self, feed: FeedId, now: DateTime<Utc>) -> FeedOverview {
        let state = self.feed_state(feed);
        FeedOverview {
            feed,
            loading: state.loading(),
            error: state.error().map(str::to_string),
            fetched_at: state.fetched_at(),
            records: state.record_count(),
            live: self.is_live_at(feed, now),
            metrics: self.derived_metrics(feed),
        }
    }
}

fn derive_from<R: NormalizedRecord + Derive>(state: &FeedState<R>) -> Option<DerivedMetrics> {
    state.snapshot.as_ref().map(|s| R::derive(&s.records))
}

/// Shared handle used by the HTTP layer and background tasks.
pub type SharedDashboard = Arc<Dashboard>;
