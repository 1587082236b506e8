//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use fwc_config::FwcConfig;
use fwc_rbac::middleware::route_context;

use crate::handlers::{health, update_profile};
use crate::services::ServiceContainer;

/// Server application struct
pub struct Server {
    config: FwcConfig,
    services: ServiceContainer,
}

impl Server {
    /// Create a new server instance
    pub async fn new(config: FwcConfig) -> Result<Self> {
        fwc_logging::init_tracing(&config.logging)?;
        let services = ServiceContainer::new(&config).await?;
        Ok(Self { config, services })
    }

    /// Server on already-built services
    pub fn with_services(config: FwcConfig, services: ServiceContainer) -> Self {
        Self { config, services }
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let profile_api = Router::new()
            .route("/api/internal/update-profile", post(update_profile))
            .with_state(self.services.profile_api_state());

        Router::new()
            .route("/health", get(health))
            .merge(fwc_identity::routes(self.services.identity_state()))
            .merge(profile_api)
            .layer(from_fn_with_state(self.services.rbac.clone(), route_context))
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let app = self.build_app();
        let addr = self.config.server.listen_address();

        self.log_config_summary();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_config_summary(&self) {
        let auth = &self.config.auth;
        tracing::info!(
            bind = %self.config.server.listen_address(),
            admin_path_segment = %auth.admin_path_segment,
            default_role = %auth.default_role,
            audit_logging = auth.audit_logging,
            bridge_secret = auth.internal_secret.is_some(),
            api_key = auth.api_key.is_some(),
            role_sync = self.config.identity_provider.credentials().is_some(),
            "FWC server configuration"
        );
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
