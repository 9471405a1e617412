//! Configuration module
//!
//! Loads and validates the YAML configuration file. A missing file is created
//! with defaults so a first run produces a template the operator can edit.
//! All failures here are fatal at startup, before any socket is bound.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::common::{Endpoint, RelayError, Result};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Configuration format version written into newly created files
pub const CONFIG_VERSION: &str = "1.0";

/// Relay configuration
///
/// Ports are declared as `u32` so an out-of-range value such as `70000` is
/// rejected by [`RelayConfig::validate`] with a readable message instead of
/// failing deep inside deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Configuration format version
    #[serde(rename = "config-ver", default = "default_config_ver")]
    pub config_ver: String,

    /// Local listen port (bound on all interfaces)
    pub port: u32,

    /// Forward target; required, but optional here so its absence is a
    /// validation error rather than a parse error
    #[serde(rename = "forward-server")]
    pub forward_server: Option<ForwardServer>,

    /// Optional cap on concurrent sessions; absent means unbounded
    #[serde(rename = "max-connections", default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<usize>,
}

/// The `forward-server` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardServer {
    /// Remote host (IP address or DNS name)
    pub ip: String,
    /// Remote port
    pub port: u32,
}

fn default_config_ver() -> String {
    CONFIG_VERSION.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            config_ver: CONFIG_VERSION.to_string(),
            port: 25565,
            forward_server: Some(ForwardServer {
                ip: "example.com".to_string(),
                port: 25565,
            }),
            max_connections: None,
        }
    }
}

impl RelayConfig {
    /// Load the configuration from `path`, creating the file with default
    /// contents first if it does not exist. The returned configuration has
    /// already been validated.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let rendered = serde_yaml::to_string(&Self::default())
                .map_err(|e| RelayError::Config(format!("Failed to render default config: {}", e)))?;
            fs::write(path, rendered)
                .map_err(|e| RelayError::Config(format!("Failed to create config file {}: {}", path.display(), e)))?;
            info!("Created default config file at: {}", path.display());
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| RelayError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        Self::from_yaml(&raw)
    }

    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: RelayConfig = serde_yaml::from_str(raw)
            .map_err(|e| RelayError::Config(format!("Config parsing error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate port ranges and the presence of the forward-server block
    pub fn validate(&self) -> Result<()> {
        if !(1..=65535).contains(&self.port) {
            return Err(RelayError::Config(format!("Invalid local port: {}", self.port)));
        }

        let forward = self
            .forward_server
            .as_ref()
            .ok_or_else(|| RelayError::Config("Missing forward-server configuration".to_string()))?;

        if !(1..=65535).contains(&forward.port) {
            return Err(RelayError::Config(format!("Invalid remote port: {}", forward.port)));
        }

        if forward.ip.trim().is_empty() {
            return Err(RelayError::Config("Empty forward-server ip".to_string()));
        }

        if self.max_connections == Some(0) {
            return Err(RelayError::Config(
                "max-connections must be at least 1 (omit it for unbounded)".to_string(),
            ));
        }

        Ok(())
    }

    /// Local listen port
    ///
    /// The fields are public, so this re-checks the range rather than
    /// trusting that [`validate`](Self::validate) has run: an out-of-range
    /// value is an error here too, never a truncated port.
    pub fn listen_port(&self) -> Result<u16> {
        u16::try_from(self.port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| RelayError::Config(format!("Invalid local port: {}", self.port)))
    }

    /// The validated forward target
    pub fn remote(&self) -> Result<Endpoint> {
        let forward = self
            .forward_server
            .as_ref()
            .ok_or_else(|| RelayError::Config("Missing forward-server configuration".to_string()))?;
        Endpoint::new(forward.ip.clone(), forward.port as u16)
    }
}
