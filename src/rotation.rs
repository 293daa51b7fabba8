// src/rotation.rs
//! # View Rotation
//! Two-state rotation (NBD ↔ Inventory) driven by a deadline.
//!
//! Timer expiry and manual toggles go through the same transition: swap the
//! view and restart the countdown from `now`. A toggle is therefore an early
//! expiry, never a jump that keeps the old deadline.
//!
//! The state is an immutable `RotationState` value replaced on every switch
//! and published through a `watch` cell.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::feeds::FeedId;

/// Time between automatic switches (2 minutes).
pub const DEFAULT_ROTATION_PERIOD: Duration = Duration::from_secs(120);

/// How often a display should resample the countdown.
pub const COUNTDOWN_CADENCE: Duration = Duration::from_secs(1);

pub(crate) fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "rotation_switches_total",
            "View switches, by trigger (timer or manual)."
        );
        describe_gauge!("rotation_period_seconds", "Configured rotation period.");
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewId {
    Nbd,
    Inventory,
}

impl ViewId {
    pub fn swap(self) -> Self {
        match self {
            ViewId::Nbd => ViewId::Inventory,
            ViewId::Inventory => ViewId::Nbd,
        }
    }

    /// Feed whose snapshot this view displays.
    pub fn feed(self) -> FeedId {
        match self {
            ViewId::Nbd => FeedId::Nbd,
            ViewId::Inventory => FeedId::Inventory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchTrigger {
    Timer,
    Manual,
}

impl SwitchTrigger {
    fn as_str(self) -> &'static str {
        match self {
            SwitchTrigger::Timer => "timer",
            SwitchTrigger::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationState {
    pub active_view: ViewId,
    pub next_switch_at: DateTime<Utc>,
}

impl RotationState {
    pub fn initial(now: DateTime<Utc>, period: TimeDelta) -> Self {
        Self {
            active_view: ViewId::Nbd,
            next_switch_at: now + period,
        }
    }

    /// The single transition: other view, fresh deadline.
    pub fn switched(&self, now: DateTime<Utc>, period: TimeDelta) -> Self {
        Self {
            active_view: self.active_view.swap(),
            next_switch_at: now + period,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_switch_at
    }

    pub fn countdown(&self, now: DateTime<Utc>, period: TimeDelta) -> Countdown {
        Countdown::between(now, self.next_switch_at, period)
    }
}

/// Presentational countdown. Always within range even if the clock jumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub time_left_ms: u64,
    /// 1 = full period left, 0 = switching now.
    pub progress: f64,
    /// `MM:SS`
    pub label: String,
}

impl Countdown {
    pub fn between(now: DateTime<Utc>, deadline: DateTime<Utc>, period: TimeDelta) -> Self {
        let left_ms = (deadline - now).num_milliseconds().max(0);
        let period_ms = period.num_milliseconds();
        let progress = if period_ms > 0 {
            (left_ms as f64 / period_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let minutes = left_ms / 60_000;
        let seconds = (left_ms % 60_000) / 1_000;
        Self {
            time_left_ms: left_ms as u64,
            progress,
            label: format!("{minutes:02}:{seconds:02}"),
        }
    }
}

/// Owner of the rotation state.
pub struct Rotation {
    period: TimeDelta,
    state: watch::Sender<RotationState>,
}

impl Rotation {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Utc::now(), period)
    }

    pub fn starting_at(now: DateTime<Utc>, period: Duration) -> Self {
        let period = TimeDelta::from_std(period)
            .ok()
            .filter(|p| *p > TimeDelta::zero())
            .unwrap_or_else(default_period);
        gauge!("rotation_period_seconds").set(period.num_seconds() as f64);
        let (state, _) = watch::channel(RotationState::initial(now, period));
        Self { period, state }
    }

    pub fn period(&self) -> TimeDelta {
        self.period
    }

    pub fn current(&self) -> RotationState {
        *self.state.borrow()
    }

    pub fn active_view(&self) -> ViewId {
        self.current().active_view
    }

    pub fn subscribe(&self) -> watch::Receiver<RotationState> {
        self.state.subscribe()
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        self.current().countdown(now, self.period)
    }

    /// Switch if the deadline has passed. Returns the new state when it did.
    pub fn tick(&self, now: DateTime<Utc>) -> Option<RotationState> {
        self.switch(now, SwitchTrigger::Timer)
    }

    /// Manual override: swap immediately and restart the countdown.
    pub fn toggle(&self, now: DateTime<Utc>) -> RotationState {
        self.switch(now, SwitchTrigger::Manual)
            .unwrap_or_else(|| self.current())
    }

    fn switch(&self, now: DateTime<Utc>, trigger: SwitchTrigger) -> Option<RotationState> {
        let mut switched = None;
        self.state.send_if_modified(|s| {
            if trigger == SwitchTrigger::Timer && !s.is_due(now) {
                return false;
            }
            *s = s.switched(now, self.period);
            switched = Some(*s);
            true
        });

        if let Some(s) = switched {
            counter!("rotation_switches_total", "trigger" => trigger.as_str()).increment(1);
            tracing::debug!(
                target: "rotation",
                trigger = trigger.as_str(),
                view = ?s.active_view,
                next_switch_at = %s.next_switch_at,
                "view switched"
            );
        }
        switched
    }

    /// Timer loop: sleep until the current deadline, or wake early when a
    /// toggle replaces the state, then re-evaluate.
    pub async fn run(&self) {
        let mut rx = self.subscribe();
        loop {
            let deadline = rx.borrow_and_update().next_switch_at;
            let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.tick(Utc::now());
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

fn default_period() -> TimeDelta {
    TimeDelta::seconds(DEFAULT_ROTATION_PERIOD.as_secs() as i64)
}
