//! One-shot probe: refresh both configured feeds once and print what the
//! dashboard would show (normalized records, metrics, liveness).

use kiosk_rotation_core::{Dashboard, DashboardConfig, FeedId};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = DashboardConfig::load_default()?;
    let dashboard = Dashboard::from_config(&cfg);

    for feed in FeedId::ALL {
        match dashboard.refresh(feed).await {
            Ok(()) => println!("[{feed}] ok"),
            Err(e) => println!("[{feed}] failed: {e}"),
        }
        let state = dashboard.feed_state(feed);
        println!("{}", serde_json::to_string_pretty(&state)?);
        println!(
            "metrics={} live={}",
            serde_json::to_string(&dashboard.derived_metrics(feed))?,
            dashboard.is_live(feed)
        );
    }

    println!("feed-probe done");
    Ok(())
}
