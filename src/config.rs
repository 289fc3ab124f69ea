// src/config.rs
//! Service configuration: defaults ← optional TOML file ← environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/esg.toml";
pub const DEFAULT_CATALOG_PATH: &str = "data/sp500.json";

pub const ENV_CONFIG_PATH: &str = "ESG_CONFIG_PATH";
pub const ENV_CATALOG_PATH: &str = "ESG_CATALOG_PATH";
pub const ENV_HOT_RELOAD: &str = "ESG_HOT_RELOAD";
pub const ENV_DEBUG_ROUTES: &str = "ESG_DEBUG_ROUTES";
pub const ENV_DEV_LOG: &str = "ESG_DEV_LOG";

fn default_catalog_path() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG_PATH)
}

fn default_poll_secs() -> u64 {
    2
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// JSON catalog to rank.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Poll the catalog file and reload on change.
    #[serde(default)]
    pub hot_reload: bool,
    #[serde(default = "default_poll_secs")]
    pub hot_reload_poll_secs: u64,
    /// Expose /debug/* and /metrics.
    #[serde(default)]
    pub debug_routes: bool,
    /// Log a hashed query id and parsed keys per request.
    #[serde(default)]
    pub dev_log: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            hot_reload: false,
            hot_reload_poll_secs: default_poll_secs(),
            debug_routes: false,
            dev_log: false,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(s).context("parsing service config")?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Resolve the effective config:
    /// 1) $ESG_CONFIG_PATH (must exist) or config/esg.toml (if present), else defaults
    /// 2) per-field env overrides
    pub fn load() -> Result<Self> {
        let base = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => Self::load_from(Path::new(&p))?,
            Err(_) => {
                let p = PathBuf::from(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    Self::load_from(&p)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(p) = std::env::var(ENV_CATALOG_PATH) {
            if !p.trim().is_empty() {
                self.catalog_path = PathBuf::from(p.trim());
            }
        }
        if let Some(on) = env_flag(ENV_HOT_RELOAD) {
            self.hot_reload = on;
        }
        if let Some(on) = env_flag(ENV_DEBUG_ROUTES) {
            self.debug_routes = on;
        }
        if let Some(on) = env_flag(ENV_DEV_LOG) {
            self.dev_log = on;
        }
        self
    }

    pub fn hot_reload_poll(&self) -> Duration {
        Duration::from_secs(self.hot_reload_poll_secs.max(1))
    }
}

/// "1"/"true"/"yes"/"on" → Some(true), "0"/"false"/"no"/"off" → Some(false), else None.
fn env_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
