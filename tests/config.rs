// tests/config.rs
use kiosk_rotation_core::config::dashboard::{
    ENV_CONFIG_PATH, ENV_INVENTORY_FEED_URL, ENV_NBD_FEED_URL, ENV_POLL_INTERVAL_SECS,
    ENV_ROTATION_PERIOD_SECS,
};
use kiosk_rotation_core::DashboardConfig;
use std::time::Duration;
use std::{env, fs};

fn clear_env() {
    for k in [
        ENV_CONFIG_PATH,
        ENV_NBD_FEED_URL,
        ENV_INVENTORY_FEED_URL,
        ENV_ROTATION_PERIOD_SECS,
        ENV_POLL_INTERVAL_SECS,
        "LIVENESS_WINDOW_SECS",
        "FETCH_TIMEOUT_SECS",
    ] {
        env::remove_var(k);
    }
}

#[test]
fn load_toml_and_json_files() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("dashboard.toml");
    fs::write(
        &p_toml,
        r#"
nbd_url = "https://sheets.example/nbd"
inventory_url = "https://sheets.example/inventory"
rotation_period_secs = 60
poll_interval_secs = 30
"#,
    )
    .unwrap();
    let c = DashboardConfig::load_from(&p_toml).unwrap();
    assert_eq!(c.rotation_period(), Duration::from_secs(60));
    assert_eq!(c.poll_interval(), Some(Duration::from_secs(30)));
    assert_eq!(c.liveness_window(), Duration::from_secs(300));

    let p_json = dir.path().join("dashboard.json");
    fs::write(&p_json, r#"{"nbd_url":"https://x.example","inventory_url":"https://y.example"}"#)
        .unwrap();
    let c = DashboardConfig::load_from(&p_json).unwrap();
    assert_eq!(c.rotation_period(), Duration::from_secs(120));
    assert!(c.validate().is_ok());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing configured → missing URL error
    let err = DashboardConfig::load_default().unwrap_err().to_string();
    assert!(err.contains("nbd"), "{err}");

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("dashboard.toml"),
        r#"
nbd_url = "https://file.example/nbd"
inventory_url = "https://file.example/inv"
rotation_period_secs = 0
"#,
    )
    .unwrap();
    let c = DashboardConfig::load_default().unwrap();
    assert_eq!(c.nbd_url, "https://file.example/nbd");
    assert_eq!(c.rotation_period(), Duration::from_secs(120), "zero sanitized");

    // 3) Env overrides individual values
    env::set_var(ENV_INVENTORY_FEED_URL, " https://env.example/inv ");
    env::set_var(ENV_ROTATION_PERIOD_SECS, "45");
    env::set_var(ENV_POLL_INTERVAL_SECS, "15");
    let c = DashboardConfig::load_default().unwrap();
    assert_eq!(c.nbd_url, "https://file.example/nbd");
    assert_eq!(c.inventory_url, "https://env.example/inv");
    assert_eq!(c.rotation_period(), Duration::from_secs(45));
    assert_eq!(c.poll_interval(), Some(Duration::from_secs(15)));

    // 4) Explicit path wins over ./config/
    let p_env = tmp.path().join("other.json");
    fs::write(
        &p_env,
        r#"{"nbd_url":"https://path.example/nbd","inventory_url":"https://path.example/inv"}"#,
    )
    .unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    env::remove_var(ENV_INVENTORY_FEED_URL);
    let c = DashboardConfig::load_default().unwrap();
    assert_eq!(c.nbd_url, "https://path.example/nbd");

    // 5) Dangling path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(DashboardConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[test]
fn non_http_url_is_rejected() {
    let c = DashboardConfig {
        nbd_url: "ftp://a.example".into(),
        inventory_url: "https://b.example".into(),
        ..DashboardConfig::default()
    };
    assert!(c.validate().is_err());
}
