// Application wiring: builds the concrete service graph from configuration.

use crate::adapters::{AnthropicClient, LopdfExtractor, PgTemplateStore};
use crate::config::ServiceConfig;
use crate::core::analyzer::{AnalysisService, AnalysisSettings};
use crate::server::{self, AppState};
use crate::utils::error::{AnalyzerError, Result};
use std::sync::Arc;

pub struct Application {
    config: ServiceConfig,
    store: PgTemplateStore,
    service: AnalysisService,
}

impl Application {
    pub fn build(config: ServiceConfig) -> Result<Self> {
        let store = PgTemplateStore::from_config(&config)?;

        if config.anthropic_api_key.is_none() {
            tracing::warn!("ANTHROPIC_API_KEY not set, analysis requests will fail");
        }

        let service = AnalysisService::new(
            Arc::new(LopdfExtractor::new()),
            Arc::new(store.clone()),
            Arc::new(AnthropicClient::from_config(&config)),
            AnalysisSettings::from_config(&config),
        );

        Ok(Self {
            config,
            store,
            service,
        })
    }

    pub fn service(&self) -> &AnalysisService {
        &self.service
    }

    /// Serves HTTP until ctrl-c, then closes the template pool.
    pub async fn serve(self) -> Result<()> {
        let address = self.config.bind_address();
        let state = AppState::new(self.service, self.config.server.max_upload_bytes);
        let app = server::router(state);

        let listener = tokio::net::TcpListener::bind(&address).await?;
        tracing::info!("Server listening on http://{}", address);
        tracing::info!(
            "Model: {}, prompt source: {:?}",
            self.config.provider.model,
            self.config.templates.source
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| AnalyzerError::internal(format!("Server error: {}", e)))?;

        self.store.close().await;
        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
