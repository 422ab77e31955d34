//! Server configuration

use anyhow::Context;
use axum::http::HeaderValue;
use creditrisk_core::Error;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Include internal error details in 500 responses
    #[serde(default)]
    pub debug: bool,

    /// Try to load the model before accepting traffic
    #[serde(default = "default_true")]
    pub preload_model: bool,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Request limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Cross-origin policy
    #[serde(default)]
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path))?
        } else {
            Self::default()
        };

        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI/environment overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.model_path = PathBuf::from(model);
        }

        if let Some(listen) = &cli.listen {
            self.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }

        if cli.debug {
            self.debug = true;
        }

        if let Some(format) = cli.log_format {
            self.log_format = format;
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> creditrisk_core::Result<()> {
        if self.port == 0 {
            return Err(Error::config("port must be non-zero"));
        }
        if self.limits.request_timeout_secs == 0 {
            return Err(Error::config("limits.request_timeout_secs must be positive"));
        }
        if self.limits.max_concurrent_requests == 0 {
            return Err(Error::config("limits.max_concurrent_requests must be positive"));
        }
        if self.limits.max_body_bytes == 0 {
            return Err(Error::config("limits.max_body_bytes must be positive"));
        }
        if let Some(origin) = self
            .cors
            .allowed_origins
            .iter()
            .find(|origin| HeaderValue::from_str(origin).is_err())
        {
            return Err(Error::config(format!("invalid CORS origin: {}", origin)));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Address to bind
    pub fn socket_addr(&self) -> creditrisk_core::Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .map_err(|e| {
                Error::config(format!(
                    "invalid listen address {}:{}: {}",
                    self.listen, self.port, e
                ))
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_path: default_model_path(),
            debug: false,
            preload_model: true,
            log_format: LogFormat::default(),
            limits: LimitsConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

/// Request limits enforced by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// In-flight requests across all routes
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Maximum request body size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout_secs(),
            max_concurrent_requests: default_max_concurrent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
        }
    }
}

/// Log output format, selectable from the config file or `--log-format`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./model/credit_model.json")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent() -> usize {
    1000
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:8000".to_string(),
        "http://127.0.0.1:8000".to_string(),
    ]
}

fn default_true() -> bool {
    true
}
