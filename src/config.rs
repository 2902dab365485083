use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:9003";
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 120;
const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the Prometheus server, e.g. `http://prometheus:9090`.
    pub prometheus_url: String,
    /// Cluster identifier for series that carry no `cluster_id` label.
    pub cluster_id: String,
    pub query_timeout: Duration,
    pub server_addr: String,
    /// Root of persisted fixed-info records (`<data_dir>/info/*.rci`).
    pub data_dir: PathBuf,
    /// Directory for daily-rolling log files; stdout when unset.
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Reads configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prometheus_url = lookup("CLUSTERCOST_PROMETHEUS_URL")
            .context("CLUSTERCOST_PROMETHEUS_URL must be set")?;

        let query_timeout_secs = match lookup("CLUSTERCOST_QUERY_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CLUSTERCOST_QUERY_TIMEOUT_SECS is not a number: {}", v))?,
            None => DEFAULT_QUERY_TIMEOUT_SECS,
        };

        let config = Self {
            prometheus_url: prometheus_url.trim().to_string(),
            cluster_id: lookup("CLUSTER_ID").unwrap_or_default(),
            query_timeout: Duration::from_secs(query_timeout_secs),
            server_addr: lookup("CLUSTERCOST_SERVER_ADDR")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            data_dir: PathBuf::from(
                lookup("CLUSTERCOST_DATA_DIR")
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            log_dir: lookup("CLUSTERCOST_LOG_DIR").filter(|v| !v.trim().is_empty()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.prometheus_url.starts_with("http://") || self.prometheus_url.starts_with("https://"),
            "CLUSTERCOST_PROMETHEUS_URL must be an http(s) URL, got {:?}",
            self.prometheus_url
        );
        anyhow::ensure!(
            !self.query_timeout.is_zero(),
            "CLUSTERCOST_QUERY_TIMEOUT_SECS must be > 0"
        );
        anyhow::ensure!(
            !self.server_addr.is_empty(),
            "CLUSTERCOST_SERVER_ADDR must be non-empty"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = load(&[("CLUSTERCOST_PROMETHEUS_URL", "http://prometheus:9090")]).unwrap();
        assert_eq!(cfg.cluster_id, "");
        assert_eq!(cfg.query_timeout, Duration::from_secs(120));
        assert_eq!(cfg.server_addr, "0.0.0.0:9003");
        assert_eq!(cfg.data_dir, PathBuf::from("data"));
        assert_eq!(cfg.log_dir, None);
    }

    #[test]
    fn test_overrides() {
        let cfg = load(&[
            ("CLUSTERCOST_PROMETHEUS_URL", "https://prom.example"),
            ("CLUSTER_ID", "cluster-one"),
            ("CLUSTERCOST_QUERY_TIMEOUT_SECS", "30"),
            ("CLUSTERCOST_LOG_DIR", "/var/log/clustercost"),
            ("CLUSTERCOST_DATA_DIR", "/var/lib/clustercost"),
        ])
        .unwrap();
        assert_eq!(cfg.cluster_id, "cluster-one");
        assert_eq!(cfg.query_timeout, Duration::from_secs(30));
        assert_eq!(cfg.log_dir.as_deref(), Some("/var/log/clustercost"));
        assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/clustercost"));
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(load(&[]).is_err());
        assert!(load(&[("CLUSTERCOST_PROMETHEUS_URL", "prometheus:9090")]).is_err());
        assert!(load(&[
            ("CLUSTERCOST_PROMETHEUS_URL", "http://p"),
            ("CLUSTERCOST_QUERY_TIMEOUT_SECS", "0"),
        ])
        .is_err());
        assert!(load(&[
            ("CLUSTERCOST_PROMETHEUS_URL", "http://p"),
            ("CLUSTERCOST_QUERY_TIMEOUT_SECS", "soon"),
        ])
        .is_err());
    }
}
