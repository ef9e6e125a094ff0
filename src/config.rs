// src/config.rs

use std::path::Path;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::{debug, info};

use crate::logging::get_config_dir;

const CONFIG_FILE: &str = "config.toml";

/// Tunables for a scan. Every field has a default, so a partial file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub user_agent: String,
    /// Certificate-transparency search endpoint (crt.sh compatible).
    pub ct_endpoint: String,
    pub max_subdomains: usize,
    pub timeouts: ProbeTimeouts,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; RiskPrism/0.1)".to_string(),
            ct_endpoint: "https://crt.sh/".to_string(),
            max_subdomains: 10,
            timeouts: ProbeTimeouts::default(),
        }
    }
}

/// Per-probe time limits, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeTimeouts {
    pub liveness: u64,
    pub headers: u64,
    pub tls: u64,
    pub whois: u64,
    pub dns: u64,
    pub subdomains: u64,
    pub security_txt: u64,
    pub tech_stack: u64,
    pub privacy: u64,
    pub resilience: u64,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            liveness: 3,
            headers: 3,
            tls: 3,
            whois: 5,
            dns: 5,
            subdomains: 5,
            security_txt: 2,
            tech_stack: 3,
            privacy: 5,
            resilience: 3,
        }
    }
}

impl ProbeTimeouts {
    pub fn liveness(&self) -> Duration { Duration::from_secs(self.liveness) }
    pub fn headers(&self) -> Duration { Duration::from_secs(self.headers) }
    pub fn tls(&self) -> Duration { Duration::from_secs(self.tls) }
    pub fn whois(&self) -> Duration { Duration::from_secs(self.whois) }
    pub fn dns(&self) -> Duration { Duration::from_secs(self.dns) }
    pub fn subdomains(&self) -> Duration { Duration::from_secs(self.subdomains) }
    pub fn security_txt(&self) -> Duration { Duration::from_secs(self.security_txt) }
    pub fn tech_stack(&self) -> Duration { Duration::from_secs(self.tech_stack) }
    pub fn privacy(&self) -> Duration { Duration::from_secs(self.privacy) }
    pub fn resilience(&self) -> Duration { Duration::from_secs(self.resilience) }
}

impl ScanConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).wrap_err("Invalid scan configuration")
    }

    /// Loads `path` if given, otherwise `config.toml` in the project config
    /// directory. A missing default file yields the defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (get_config_dir().join(CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults.");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "Loaded scan configuration.");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = ScanConfig::from_toml(
            r#"
            max_subdomains = 5

            [timeouts]
            privacy = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.max_subdomains, 5);
        assert_eq!(config.timeouts.privacy(), Duration::from_secs(8));
        assert_eq!(config.timeouts.security_txt(), Duration::from_secs(2));
        assert_eq!(config.ct_endpoint, "https://crt.sh/");
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(ScanConfig::from_toml("timeouts = 3").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(ScanConfig::load(Some(Path::new("/nonexistent/riskprism.toml"))).is_err());
    }
}
