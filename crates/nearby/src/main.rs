//! Main application entry point for the nearby-contacts server
//!
//! Parses the CLI, loads configuration, sets up logging and serves the
//! contact gateway until a shutdown signal arrives.

mod cli;
mod config;
mod logging;
mod signals;

use cli::CliArgs;
use config::AppConfig;
use contact_server::ContactServer;
use tracing::{error, info};

/// Main application struct
pub struct Application {
    config: AppConfig,
    server: ContactServer,
}

impl Application {
    /// Loads configuration, applies CLI overrides and builds the server.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(bind_address) = args.bind_address {
            config.server.bind_address = bind_address;
        }

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {}", e).into());
        }

        logging::setup_logging(&config.logging)?;

        let server = ContactServer::new(config.to_server_config()?);

        info!(
            "🚀 nearby v{} | Config: {}",
            env!("CARGO_PKG_VERSION"),
            args.config_path.display()
        );

        Ok(Self { config, server })
    }

    /// Serves until SIGINT/SIGTERM, then logs final index statistics.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!("📋 Configuration Summary:");
        info!("  🌐 Bind address: {}", self.config.server.bind_address);
        info!(
            "  🌍 World: lat [{}, {}] lon [{}, {}]",
            self.config.world.min_lat,
            self.config.world.max_lat,
            self.config.world.min_lon,
            self.config.world.max_lon
        );
        info!(
            "  📍 Near queries: {} contacts within {} units",
            self.config.proximity.nearest_contacts, self.config.proximity.nearest_distance
        );

        let shutdown = async {
            if let Err(e) = signals::setup_signal_handlers().await {
                error!("❌ Signal handling failed: {}", e);
            }
            info!("🛑 Shutdown signal received, draining connections...");
        };

        self.server.start(shutdown).await?;

        let manager = self.server.manager();
        let stats = manager.index_stats();
        info!("📊 Final Statistics:");
        info!("  - Users tracked: {}", manager.user_count());
        info!("  - Points indexed: {}", manager.point_count());
        info!(
            "  - Inserts: {} | Relocations: {} | Queries: {}",
            stats.total_insertions, stats.total_updates, stats.total_queries
        );
        info!(
            "  - Tree: depth {} | {} leaves | {} internal nodes",
            stats.current_depth, stats.leaf_nodes, stats.internal_nodes
        );
        info!("✅ nearby shutdown complete");

        Ok(())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("❌ Failed to start application: {:?}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_application_rejects_invalid_override() {
        let dir = TempDir::new().unwrap();
        let args = CliArgs {
            config_path: dir.path().join("config.toml"),
            bind_address: Some("not an address".to_string()),
            log_level: None,
            json_logs: false,
        };

        let err = Application::new(args).await.err().expect("invalid bind address must fail");
        assert!(err.to_string().contains("Configuration validation failed"));
    }

    #[test]
    fn test_default_config_builds_server() {
        let config = AppConfig::default();
        let server = ContactServer::new(config.to_server_config().unwrap());
        assert_eq!(server.config().bind_address.port(), 9999);
        assert_eq!(server.manager().user_count(), 0);
    }
}
