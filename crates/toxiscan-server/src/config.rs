//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toxiscan_classifiers::GatewayConfig;
use toxiscan_history::HistoryConfig;
use toxiscan_orchestrator::OrchestratorConfig;

/// Top-level configuration, loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Prediction service connection
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Submission settings
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Local history cache
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Values supplied on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub upstream: Option<String>,
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub history_dir: Option<PathBuf>,
    pub ephemeral: bool,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(upstream) = &overrides.upstream {
            self.gateway.endpoint = upstream.clone();
        }

        if let Some(listen) = &overrides.listen {
            self.server.listen = listen.clone();
        }

        if let Some(port) = overrides.port {
            self.server.port = port;
        }

        if let Some(dir) = &overrides.history_dir {
            self.history.dir = Some(dir.clone());
        }

        if overrides.ephemeral {
            self.history.persist = false;
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/toxiscan.yaml", &ConfigOverrides::default()).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.gateway.endpoint, "http://127.0.0.1:5000/predict");
        assert_eq!(config.history.capacity, 100);
        assert!(config.history.persist);
    }

    #[test]
    fn test_partial_yaml_and_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("toxiscan.yaml");
        std::fs::write(
            &path,
            "gateway:\n  endpoint: http://model.internal:9000/predict\n  timeout_ms: 1500\nhistory:\n  capacity: 25\n",
        )
        .unwrap();

        let overrides = ConfigOverrides {
            port: Some(8080),
            ephemeral: true,
            ..Default::default()
        };
        let config = AppConfig::load(&path, &overrides).unwrap();

        assert_eq!(config.gateway.endpoint, "http://model.internal:9000/predict");
        assert_eq!(config.gateway.timeout_ms, 1500);
        assert_eq!(config.history.capacity, 25);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.listen, "127.0.0.1");
        assert!(!config.history.persist);
    }

    #[test]
    fn test_upstream_override() {
        let mut config = AppConfig::default();
        config.apply(&ConfigOverrides {
            upstream: Some("http://localhost:7000/predict".to_string()),
            ..Default::default()
        });
        assert_eq!(config.gateway.endpoint, "http://localhost:7000/predict");
    }
}
