//! Server bootstrap: owns the manager and serves the gateway.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gateway;
use crate::manager::LocationManager;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// The contact server.
///
/// Holds the one [`LocationManager`] of the process and hands it to the
/// gateway through router state.
pub struct ContactServer {
    config: ServerConfig,
    manager: Arc<LocationManager>,
}

impl ContactServer {
    pub fn new(config: ServerConfig) -> Self {
        let manager = Arc::new(LocationManager::new(&config));
        Self { config, manager }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn manager(&self) -> Arc<LocationManager> {
        self.manager.clone()
    }

    pub fn router(&self) -> Router {
        gateway::router(self.manager.clone())
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_address)
            .await
            .map_err(|e| {
                ServerError::Network(format!(
                    "Failed to bind to {}: {}",
                    self.config.bind_address, e
                ))
            })?;

        self.serve(listener, shutdown).await
    }

    /// Serves the gateway on an already bound listener.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Listener has no local address: {e}")))?;
        info!("🚀 Contact gateway listening on {}", local_addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Network(format!("Server error: {e}")))?;

        info!("Contact gateway on {} stopped", local_addr);
        Ok(())
    }
}
