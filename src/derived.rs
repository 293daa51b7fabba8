// src/derived.rs
//! Derived metrics: cross-record aggregates computed from one snapshot.
//!
//! Pure functions over a borrowed slice; nothing is cached or accumulated
//! between snapshots.

use serde::Serialize;

use crate::schema::{InventoryRecord, ProgressRecord};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMetrics {
    /// Overall conversion in percent, within `[0, 100]`.
    pub conversion_ratio: f64,
    /// Target still to convert, never negative.
    pub remaining_target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryMetrics {
    pub total_stock: f64,
    pub total_sold: f64,
}

/// Metrics for whichever feed was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DerivedMetrics {
    Progress(ProgressMetrics),
    Inventory(InventoryMetrics),
}

/// Record kinds that have header metrics.
pub trait Derive: Sized {
    fn derive(records: &[Self]) -> DerivedMetrics;
}

impl Derive for ProgressRecord {
    fn derive(records: &[Self]) -> DerivedMetrics {
        DerivedMetrics::Progress(progress_metrics(records))
    }
}

impl Derive for InventoryRecord {
    fn derive(records: &[Self]) -> DerivedMetrics {
        DerivedMetrics::Inventory(inventory_metrics(records))
    }
}

pub fn progress_metrics(records: &[ProgressRecord]) -> ProgressMetrics {
    let leads: f64 = records.iter().map(|r| r.leads).sum();
    let converted: f64 = records.iter().map(|r| r.converted).sum();
    let target: f64 = records.iter().map(|r| r.target).sum();

    let conversion_ratio = if leads > 0.0 && leads.is_finite() {
        (converted / leads * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let gap = (target - converted).round();
    // `as` saturates, so an overflowing sum still yields a bounded value
    let remaining_target = if gap.is_nan() || gap <= 0.0 {
        0
    } else {
        gap as u64
    };

    ProgressMetrics {
        conversion_ratio,
        remaining_target,
    }
}

pub fn inventory_metrics(records: &[InventoryRecord]) -> InventoryMetrics {
    InventoryMetrics {
        total_stock: records.iter().map(|r| r.available_stock).sum(),
        total_sold: records.iter().map(|r| r.sold).sum(),
    }
}
