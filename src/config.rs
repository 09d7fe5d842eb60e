// =============================================================================
// Service Configuration: JSON file with per-field defaults and env overrides
// =============================================================================
//
// Deployment knobs only: where to listen, who may call us, where the upstream
// feeds live.  Analysis constants (day offsets, worker bound, benchmark) are
// compile-time constants next to the code that uses them.
//
// All fields carry `#[serde(default = ...)]` so a partial or missing file
// still produces a usable configuration.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    [
        "https://300spicks-production.up.railway.app",
        "https://sctrpicks.pages.dev",
        "https://srankpicks.pages.dev",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
        "http://localhost:5174",
        "http://localhost:5175",
        "http://localhost:5176",
        "http://localhost:5177",
        "http://localhost:5178",
        "http://localhost:5179",
        "http://127.0.0.1:5179",
        "http://localhost:5180",
        "http://127.0.0.1:5180",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ranking_url() -> String {
    "https://stockcharts.com/j-sum/sum?cmd=sctr&view=L&timeframe=I".to_string()
}

fn default_price_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_history_range() -> String {
    "4mo".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_ranking_timeout_secs() -> u64 {
    45
}

// =============================================================================
// ServiceConfig
// =============================================================================

/// Top-level configuration for the SCTR Picks service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Browser origins allowed by CORS (credentials enabled).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// SCTR ranking feed.
    #[serde(default = "default_ranking_url")]
    pub ranking_url: String,

    /// Base URL of the chart API.
    #[serde(default = "default_price_base_url")]
    pub price_base_url: String,

    /// History window requested per symbol. Must cover at least 61 sessions.
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Per-request timeout for price fetches.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Timeout for the ranking fetch.
    #[serde(default = "default_ranking_timeout_secs")]
    pub ranking_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
            ranking_url: default_ranking_url(),
            price_base_url: default_price_base_url(),
            history_range: default_history_range(),
            http_timeout_secs: default_http_timeout_secs(),
            ranking_timeout_secs: default_ranking_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            origins = config.allowed_origins.len(),
            "service config loaded"
        );

        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally
    /// `std::env::var(..).ok()`).
    ///
    /// * `PORT`                 - bind `0.0.0.0:$PORT` (platform convention)
    /// * `SCTR_BIND_ADDR`       - full bind address, wins over `PORT`
    /// * `SCTR_ALLOWED_ORIGINS` - comma-separated origin list
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT").filter(|p| p.trim().parse::<u16>().is_ok()) {
            self.bind_addr = format!("0.0.0.0:{}", port.trim());
        }
        if let Some(addr) = lookup("SCTR_BIND_ADDR").filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(origins) = lookup("SCTR_ALLOWED_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.allowed_origins = parsed;
            }
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn ranking_timeout(&self) -> Duration {
        Duration::from_secs(self.ranking_timeout_secs.max(1))
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000");
        assert_eq!(cfg.history_range, "4mo");
        assert_eq!(cfg.http_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.ranking_timeout(), Duration::from_secs(45));
        assert!(cfg
            .allowed_origins
            .iter()
            .any(|o| o == "http://localhost:5173"));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ServiceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ServiceConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "history_range": "6mo", "allowed_origins": ["https://example.org"] }"#;
        let cfg: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.history_range, "6mo");
        assert_eq!(cfg.allowed_origins, vec!["https://example.org"]);
        assert_eq!(cfg.http_timeout_secs, 10);
    }

    #[test]
    fn port_env_sets_bind_addr() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_env(env(&[("PORT", "9100")]));
        assert_eq!(cfg.bind_addr, "0.0.0.0:9100");
    }

    #[test]
    fn explicit_bind_addr_wins_and_bad_port_is_ignored() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_env(env(&[("PORT", "not-a-port"), ("SCTR_BIND_ADDR", "127.0.0.1:7000")]));
        assert_eq!(cfg.bind_addr, "127.0.0.1:7000");
    }

    #[test]
    fn origins_env_is_split_and_trimmed() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_env(env(&[("SCTR_ALLOWED_ORIGINS", " https://a.dev , ,https://b.dev")]));
        assert_eq!(cfg.allowed_origins, vec!["https://a.dev", "https://b.dev"]);
    }

    #[test]
    fn zero_timeouts_are_clamped() {
        let cfg = ServiceConfig {
            http_timeout_secs: 0,
            ..ServiceConfig::default()
        };
        assert_eq!(cfg.http_timeout(), Duration::from_secs(1));
    }
}
