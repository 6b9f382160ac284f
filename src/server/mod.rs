//! HTTP surface
//!
//! Thin axum layer over the retriever and the hybrid scorer. The state is
//! built once from [`AppResources`] and cloned into every handler; nothing
//! in it is mutated after startup.

pub mod handlers;

pub use handlers::{
    health, model_info, predict_documents, root, suggest_hs, CatalogInfo, ErrorBody, HealthBody,
    ModelInfo, ServiceInfo, INTERNAL_ERROR_MESSAGE,
};

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::bootstrap::AppResources;
use crate::config::Config;
use crate::loader::RetrieverHandle;
use crate::retrieval::SemanticRetriever;
use crate::scoring::HybridScorer;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub scorer: HybridScorer,
    pub hs: SemanticRetriever,
    pub documents: Arc<RetrieverHandle>,
    pub rule_count: usize,
    pub expose_load_errors: bool,
}

impl AppState {
    pub fn new(resources: &AppResources, config: &Config) -> Self {
        Self {
            scorer: resources.scorer(config),
            hs: resources.hs_retriever(),
            documents: resources.documents.clone(),
            rule_count: resources.rule_count,
            expose_load_errors: config.server.expose_load_errors,
        }
    }
}

/// All routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/model-info", get(model_info))
        .route("/suggest-hs", post(suggest_hs))
        .route("/predict-documents", post(predict_documents))
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {}", bind))?;

    info!("{}", "=".repeat(60));
    info!("Starting Pre-Clear recommender service");
    info!(
        hs = state.hs.handle().state().label(),
        documents = state.documents.state().label(),
        rules = state.rule_count,
        "architecture: hybrid (deterministic rules + semantic retrieval)"
    );
    info!(%addr, "listening");
    info!("{}", "=".repeat(60));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
