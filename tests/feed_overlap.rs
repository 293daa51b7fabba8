// tests/feed_overlap.rs
//
// Overlapping refreshes of one feed: the call that completes last wins,
// and `loading` stays set until nothing is in flight. A refresh dropped
// mid-fetch still gives its in-flight slot back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kiosk_rotation_core::feeds::sources::FeedSource;
use kiosk_rotation_core::schema::InventoryRecord;
use kiosk_rotation_core::{FeedError, FeedId, FeedPoller};

/// First call is slow, every later call answers immediately.
struct SlowThenFast {
    calls: AtomicUsize,
}

#[async_trait]
impl FeedSource for SlowThenFast {
    async fn fetch_body(&self) -> Result<String, FeedError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(r#"[{"Tool":"Slow"}]"#.to_string())
        } else {
            Ok(r#"[{"Tool":"Fast"}]"#.to_string())
        }
    }

    fn describe(&self) -> &str {
        "slow-then-fast"
    }
}

#[tokio::test]
async fn later_completion_wins_and_loading_tracks_in_flight() {
    let p = std::sync::Arc::new(FeedPoller::<InventoryRecord>::new(
        FeedId::Inventory,
        SlowThenFast {
            calls: AtomicUsize::new(0),
        },
    ));

    let slow = {
        let p = p.clone();
        tokio::spawn(async move { p.refresh().await })
    };
    // let the slow call get in first
    tokio::time::sleep(Duration::from_millis(50)).await;

    p.refresh().await.expect("fast refresh");
    let s = p.state();
    assert_eq!(s.records()[0].tool, "Fast");
    assert!(s.loading, "slow call still in flight");

    slow.await.unwrap().expect("slow refresh");
    let s = p.state();
    assert_eq!(s.records()[0].tool, "Slow");
    assert!(!s.loading);
}

#[tokio::test]
async fn refresh_marks_loading_and_clears_error_immediately() {
    struct Pending;

    #[async_trait]
    impl FeedSource for Pending {
        async fn fetch_body(&self) -> Result<String, FeedError> {
            std::future::pending::<()>().await;
            unreachable!()
        }

        fn describe(&self) -> &str {
            "pending"
        }
    }

    let p = std::sync::Arc::new(FeedPoller::<InventoryRecord>::new(FeedId::Inventory, Pending));
    let mut rx = p.subscribe();

    let task = {
        let p = p.clone();
        tokio::spawn(async move { p.refresh().await })
    };
    rx.changed().await.unwrap();
    let s = rx.borrow().clone();
    assert!(s.loading);
    assert!(s.error.is_none());

    // a fetch that never resolves leaves the feed loading
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(p.state().loading);
    task.abort();
}

/// First call never answers, later calls succeed.
struct HangsOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl FeedSource for HangsOnce {
    async fn fetch_body(&self) -> Result<String, FeedError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(r#"[{"Tool":"Drill","Stock":3}]"#.to_string())
    }

    fn describe(&self) -> &str {
        "hangs-once"
    }
}

#[tokio::test]
async fn dropped_refresh_does_not_leave_feed_loading() {
    let p = FeedPoller::<InventoryRecord>::new(
        FeedId::Inventory,
        HangsOnce {
            calls: AtomicUsize::new(0),
        },
    );

    let abandoned = tokio::time::timeout(Duration::from_millis(50), p.refresh()).await;
    assert!(abandoned.is_err(), "first fetch should still be pending");
    let s = p.state();
    assert!(!s.loading);
    assert!(s.snapshot.is_none());
    assert!(s.error.is_none());

    for _ in 0..2 {
        p.refresh().await.expect("refresh after abandoned cycle");
        let s = p.state();
        assert!(!s.loading);
        assert_eq!(s.records()[0].tool, "Drill");
    }
}

#[tokio::test]
async fn aborted_refresh_task_settles_loading() {
    let p = std::sync::Arc::new(FeedPoller::<InventoryRecord>::new(
        FeedId::Inventory,
        HangsOnce {
            calls: AtomicUsize::new(0),
        },
    ));

    let task = {
        let p = p.clone();
        tokio::spawn(async move { p.refresh().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(p.state().loading);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(!p.state().loading);

    p.refresh().await.expect("refresh after abort");
    assert!(!p.state().loading);
}
