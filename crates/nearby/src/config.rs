//! Configuration management for the nearby-contacts server.
//!
//! This module handles loading, validation, and conversion of server configuration
//! from TOML files.

use contact_server::{ServerConfig, WorldBounds, DEFAULT_NEAREST_CONTACTS, DEFAULT_NEAREST_DISTANCE};
use proximity_index::{IndexConfig, DEFAULT_MAX_DEPTH, DEFAULT_NODE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network settings
    pub server: ServerSettings,
    /// Region covered by the spatial index
    #[serde(default)]
    pub world: WorldBounds,
    /// Query and index tuning
    #[serde(default)]
    pub proximity: ProximitySettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
}

/// Server-specific configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Network address to bind the gateway to (e.g., "0.0.0.0:9999")
    pub bind_address: String,
}

/// Query and index tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximitySettings {
    /// Contacts returned by a `/near` query at most
    #[serde(default = "default_nearest_contacts")]
    pub nearest_contacts: usize,
    /// Half-extent of the `/near` window, in degrees
    #[serde(default = "default_nearest_distance")]
    pub nearest_distance: f64,
    /// Points per quadtree leaf before it splits
    #[serde(default = "default_node_capacity")]
    pub node_capacity: usize,
    /// Depth at which quadtree leaves stop splitting
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
}

fn default_nearest_contacts() -> usize {
    DEFAULT_NEAREST_CONTACTS
}

fn default_nearest_distance() -> f64 {
    DEFAULT_NEAREST_DISTANCE
}

fn default_node_capacity() -> usize {
    DEFAULT_NODE_CAPACITY
}

fn default_max_depth() -> u8 {
    DEFAULT_MAX_DEPTH
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            nearest_contacts: default_nearest_contacts(),
            nearest_distance: default_nearest_distance(),
            node_capacity: default_node_capacity(),
            max_depth: default_max_depth(),
        }
    }
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                bind_address: "0.0.0.0:9999".to_string(),
            },
            world: WorldBounds::default(),
            proximity: ProximitySettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, writes the default configuration to `path`
    /// and returns it.
    pub async fn load_from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Converts the application configuration into the server's own config.
    pub fn to_server_config(&self) -> Result<ServerConfig, Box<dyn std::error::Error>> {
        Ok(ServerConfig {
            bind_address: self.server.bind_address.parse()?,
            world_bounds: self.world,
            nearest_contacts: self.proximity.nearest_contacts,
            nearest_distance: self.proximity.nearest_distance,
            index: IndexConfig {
                node_capacity: self.proximity.node_capacity,
                max_depth: self.proximity.max_depth,
            },
        })
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "Invalid bind address: {}",
                &self.server.bind_address
            ));
        }

        if self.world.min_lat >= self.world.max_lat {
            return Err("World min_lat must be less than max_lat".to_string());
        }
        if self.world.min_lon >= self.world.max_lon {
            return Err("World min_lon must be less than max_lon".to_string());
        }

        if !(self.proximity.nearest_distance.is_finite() && self.proximity.nearest_distance > 0.0) {
            return Err(format!(
                "nearest_distance must be a positive number, got {}",
                self.proximity.nearest_distance
            ));
        }
        if self.proximity.node_capacity == 0 {
            return Err("node_capacity must be at least 1".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};
    use tokio::fs;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "0.0.0.0:9999");
        assert_eq!(config.world.min_lat, -85.0);
        assert_eq!(config.world.max_lon, 185.0);
        assert_eq!(config.proximity.nearest_contacts, 5);
        assert_eq!(config.proximity.nearest_distance, 10.0);
        assert_eq!(config.proximity.node_capacity, DEFAULT_NODE_CAPACITY);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_nonexistent_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9999");
        assert!(path.exists());

        // the written file round-trips
        let reloaded = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(reloaded.proximity.nearest_contacts, config.proximity.nearest_contacts);
    }

    #[tokio::test]
    async fn test_load_from_existing_file() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:3000"

[world]
min_lat = -10.0
max_lat = 10.0
min_lon = -20.0
max_lon = 20.0

[proximity]
nearest_contacts = 3
nearest_distance = 0.5

[logging]
level = "debug"
json_format = true
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.world.max_lon, 20.0);
        assert_eq!(config.proximity.nearest_contacts, 3);
        assert_eq!(config.proximity.nearest_distance, 0.5);
        // unspecified tuning falls back to defaults
        assert_eq!(config.proximity.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[tokio::test]
    async fn test_missing_sections_use_defaults() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:3000"

[logging]
level = "warn"
json_format = false
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).await.unwrap();

        let config = AppConfig::load_from_file(&temp_file.path().to_path_buf())
            .await
            .unwrap();
        assert_eq!(config.world, WorldBounds::default());
        assert_eq!(config.proximity.nearest_contacts, DEFAULT_NEAREST_CONTACTS);
    }

    #[test]
    fn test_to_server_config_conversion() {
        let mut config = AppConfig::default();
        config.server.bind_address = "192.168.1.100:8080".to_string();
        config.proximity.node_capacity = 4;
        config.proximity.nearest_distance = 0.01;

        let server_config = config.to_server_config().unwrap();
        assert_eq!(server_config.bind_address.to_string(), "192.168.1.100:8080");
        assert_eq!(server_config.index.node_capacity, 4);
        assert_eq!(server_config.nearest_distance, 0.01);
        assert_eq!(server_config.world_bounds, WorldBounds::default());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.server.bind_address = "invalid_address".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid bind address"));

        let mut config = AppConfig::default();
        config.world.min_lat = 50.0;
        config.world.max_lat = 10.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.proximity.nearest_distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.proximity.node_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));
    }
}
