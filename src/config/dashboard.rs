// src/config/dashboard.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::liveness::DEFAULT_LIVENESS_WINDOW;
use crate::rotation::DEFAULT_ROTATION_PERIOD;

pub const ENV_CONFIG_PATH: &str = "KIOSK_CONFIG_PATH";
pub const ENV_NBD_FEED_URL: &str = "NBD_FEED_URL";
pub const ENV_INVENTORY_FEED_URL: &str = "INVENTORY_FEED_URL";
pub const ENV_ROTATION_PERIOD_SECS: &str = "ROTATION_PERIOD_SECS";
pub const ENV_LIVENESS_WINDOW_SECS: &str = "LIVENESS_WINDOW_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";

const DEFAULT_TOML_PATH: &str = "config/dashboard.toml";
const DEFAULT_JSON_PATH: &str = "config/dashboard.json";

fn default_rotation_period_secs() -> u64 {
    DEFAULT_ROTATION_PERIOD.as_secs()
}
fn default_liveness_window_secs() -> u64 {
    DEFAULT_LIVENESS_WINDOW.as_secs()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// NBD progress feed endpoint.
    #[serde(default)]
    pub nbd_url: String,
    /// Inventory feed endpoint.
    #[serde(default)]
    pub inventory_url: String,
    #[serde(default = "default_rotation_period_secs")]
    pub rotation_period_secs: u64,
    #[serde(default = "default_liveness_window_secs")]
    pub liveness_window_secs: u64,
    /// Background re-poll of both feeds. `None` = only initial load and view re-entry.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    /// Per-request timeout. `None` = wait indefinitely.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            nbd_url: String::new(),
            inventory_url: String::new(),
            rotation_period_secs: default_rotation_period_secs(),
            liveness_window_secs: default_liveness_window_secs(),
            poll_interval_secs: None,
            fetch_timeout_secs: None,
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing dashboard config {}", path.display()))
    }

    /// Resolve the config the binary runs with:
    /// 1) $KIOSK_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) config/dashboard.json
    /// 4) built-in defaults
    ///
    /// then apply env overrides, sanitize and validate.
    pub fn load_default() -> Result<Self> {
        let mut cfg = Self::load_file_default()?;
        cfg.apply_env_overrides();
        cfg.sanitize();
        cfg.validate()?;
        Ok(cfg)
    }

    fn load_file_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_string(ENV_NBD_FEED_URL) {
            self.nbd_url = v;
        }
        if let Some(v) = env_string(ENV_INVENTORY_FEED_URL) {
            self.inventory_url = v;
        }
        if let Some(v) = env_u64(ENV_ROTATION_PERIOD_SECS) {
            self.rotation_period_secs = v;
        }
        if let Some(v) = env_u64(ENV_LIVENESS_WINDOW_SECS) {
            self.liveness_window_secs = v;
        }
        if let Some(v) = env_u64(ENV_POLL_INTERVAL_SECS) {
            self.poll_interval_secs = Some(v);
        }
        if let Some(v) = env_u64(ENV_FETCH_TIMEOUT_SECS) {
            self.fetch_timeout_secs = Some(v);
        }
    }

    /// Zero durations fall back to defaults; zero intervals/timeouts disable.
    pub fn sanitize(&mut self) {
        self.nbd_url = self.nbd_url.trim().to_string();
        self.inventory_url = self.inventory_url.trim().to_string();
        if self.rotation_period_secs == 0 {
            self.rotation_period_secs = default_rotation_period_secs();
        }
        if self.liveness_window_secs == 0 {
            self.liveness_window_secs = default_liveness_window_secs();
        }
        self.poll_interval_secs = self.poll_interval_secs.filter(|s| *s > 0);
        self.fetch_timeout_secs = self.fetch_timeout_secs.filter(|s| *s > 0);
    }

    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("nbd", &self.nbd_url), ("inventory", &self.inventory_url)] {
            if url.is_empty() {
                bail!("missing feed URL for `{name}` (set it in the config file or env)");
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("feed URL for `{name}` must be http(s): {url}");
            }
        }
        Ok(())
    }

    pub fn rotation_period(&self) -> Duration {
        Duration::from_secs(self.rotation_period_secs)
    }

    pub fn liveness_window(&self) -> Duration {
        Duration::from_secs(self.liveness_window_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<DashboardConfig> {
    if hint_ext == "json" {
        return Ok(serde_json::from_str(s)?);
    }
    if hint_ext == "toml" {
        return Ok(toml::from_str(s)?);
    }
    // Unknown extension: try TOML, then JSON
    if let Ok(v) = toml::from_str(s) {
        return Ok(v);
    }
    serde_json::from_str(s).map_err(|_| anyhow!("unsupported dashboard config format"))
}
