// ABOUTME: YAML configuration for a migration run
// ABOUTME: Target cluster connection, remote source credentials and the index list

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{MigratorError, Result};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 9200;

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    pub es_target_config: TargetClusterConfig,
    pub es_source_remote: RemoteCredentials,
    pub source_indices: Vec<String>,
    pub target_index: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

/// Connection parameters for the destination cluster, where reindex tasks run.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetClusterConfig {
    pub hosts: Vec<HostSpec>,
    /// Basic auth as `[username, password]`.
    #[serde(default)]
    pub http_auth: Option<(String, String)>,
    #[serde(default)]
    pub use_ssl: bool,
    #[serde(default = "default_true")]
    pub verify_certs: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

/// A target host given either as a URL string or as `{host, port, scheme}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HostSpec {
    Url(String),
    Parts {
        host: String,
        port: Option<u16>,
        scheme: Option<String>,
    },
}

/// Credentials the target cluster uses to read from the remote source cluster.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl HostSpec {
    /// Base URL without a trailing slash. `use_ssl` picks the scheme when none is given.
    pub fn base_url(&self, use_ssl: bool) -> String {
        let default_scheme = if use_ssl { "https" } else { "http" };
        match self {
            HostSpec::Url(url) => {
                let url = url.trim().trim_end_matches('/');
                if url.contains("://") {
                    url.to_string()
                } else {
                    format!("{}://{}", default_scheme, url)
                }
            }
            HostSpec::Parts { host, port, scheme } => format!(
                "{}://{}:{}",
                scheme.as_deref().unwrap_or(default_scheme),
                host,
                port.unwrap_or(DEFAULT_PORT)
            ),
        }
    }
}

impl TargetClusterConfig {
    pub fn base_urls(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.base_url(self.use_ssl)).collect()
    }
}

impl MigrationConfig {
    /// Read, parse and validate a YAML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            MigratorError::Config(format!(
                "Failed to load configuration from {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_yaml(&raw).map_err(|e| match e {
            MigratorError::Config(msg) => {
                MigratorError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })?;
        config.validate()?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| MigratorError::Config(format!("Invalid configuration: {}", e)))
    }

    /// Checks required values and collapses duplicate source indices.
    pub fn validate(&mut self) -> Result<()> {
        if self.target_index.trim().is_empty() {
            return Err(MigratorError::Config(
                "target_index must not be empty".to_string(),
            ));
        }
        if self.es_source_remote.host.trim().is_empty() {
            return Err(MigratorError::Config(
                "es_source_remote.host must not be empty".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(MigratorError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        self.source_indices.retain(|index| {
            let first = seen.insert(index.clone());
            if !first {
                warn!("Ignoring duplicate source index {}", index);
            }
            first
        });

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
es_target_config:
  hosts:
    - "https://target.example.com:9200"
  http_auth: [admin, secret]
es_source_remote:
  host: "https://source.example.com:9200"
  username: elastic
  password: changeme
source_indices:
  - logs-2023
  - logs-2024
target_index: logs-archive
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = MigrationConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.source_indices, vec!["logs-2023", "logs-2024"]);
        assert_eq!(config.target_index, "logs-archive");
        assert_eq!(config.es_source_remote.username, "elastic");
        assert_eq!(
            config.es_target_config.http_auth,
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert!(config.es_target_config.verify_certs);
        assert_eq!(config.es_target_config.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = Path::new("/nonexistent/migration.yaml");
        let err = MigrationConfig::from_file(path).unwrap_err();
        assert!(matches!(err, MigratorError::Config(_)));
        assert!(err.to_string().contains("/nonexistent/migration.yaml"));
    }

    #[test]
    fn test_from_file_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = MigrationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.source_indices.len(), 2);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let raw = "source_indices: [a]\ntarget_index: b\n";
        let err = MigrationConfig::from_yaml(raw).unwrap_err();
        assert!(matches!(err, MigratorError::Config(_)));
    }

    #[test]
    fn test_duplicate_indices_collapsed() {
        let raw = SAMPLE.replace("  - logs-2024", "  - logs-2024\n  - logs-2023");
        let mut config = MigrationConfig::from_yaml(&raw).unwrap();
        assert_eq!(config.source_indices.len(), 3);
        config.validate().unwrap();
        assert_eq!(config.source_indices, vec!["logs-2023", "logs-2024"]);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let raw = format!("{}poll_interval_secs: 0\n", SAMPLE);
        let mut config = MigrationConfig::from_yaml(&raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_target_index_rejected() {
        let raw = SAMPLE.replace("target_index: logs-archive", "target_index: \"\"");
        let mut config = MigrationConfig::from_yaml(&raw).unwrap();
        assert!(matches!(config.validate(), Err(MigratorError::Config(_))));
    }

    #[test]
    fn test_host_spec_forms() {
        let raw = r#"
hosts:
  - "localhost:9200/"
  - { host: es-2, port: 9201 }
  - { host: es-3, scheme: http }
use_ssl: true
"#;
        let target: TargetClusterConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(
            target.base_urls(),
            vec![
                "https://localhost:9200",
                "https://es-2:9201",
                "http://es-3:9200"
            ]
        );
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let config = MigrationConfig::from_yaml(SAMPLE).unwrap();
        let rendered = format!("{:?}", config.es_source_remote);
        assert!(rendered.contains("elastic"));
        assert!(!rendered.contains("changeme"));
    }
}
