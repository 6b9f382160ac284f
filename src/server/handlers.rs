// Request handlers - JSON in, JSON out
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::RecommenderError;
use crate::loader::RetrieverHandle;
use crate::server::AppState;
use crate::types::{FreeTextQuery, Recommendation, StructuredQuery, SuggestResponse};

/// Detail returned for server-side failures; the cause is only logged
pub const INTERNAL_ERROR_MESSAGE: &str = "Prediction failed due to an internal error";

const SERVICE_NAME: &str = "Pre-Clear Document Recommender";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for RecommenderError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(self.to_string()))).into_response()
        } else {
            error!(error = %self, "prediction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(INTERNAL_ERROR_MESSAGE)),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub architecture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub rules_engine: String,
    pub hs_catalog: String,
    pub document_catalog: String,
}

/// Readiness of one catalog as reported by `/model-info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CatalogInfo {
    fn from_handle(handle: &RetrieverHandle, expose_load_errors: bool) -> Self {
        let state = handle.state();
        Self {
            loaded: state.is_ready(),
            rows: state.rows(),
            reason: if expose_load_errors {
                state.reason().map(str::to_string)
            } else {
                None
            },
        }
    }
}

/// HS catalog readiness at the top level, document catalog nested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(flatten)]
    pub hs: CatalogInfo,
    pub documents: CatalogInfo,
}

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        architecture: "hybrid (rules + semantic retrieval)".to_string(),
    })
}

/// Liveness; healthy whenever the process answers
pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy".to_string(),
        rules_engine: "active".to_string(),
        hs_catalog: state.hs.handle().state().label().to_string(),
        document_catalog: state.documents.state().label().to_string(),
    })
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(ModelInfo {
        hs: CatalogInfo::from_handle(state.hs.handle(), state.expose_load_errors),
        documents: CatalogInfo::from_handle(&state.documents, state.expose_load_errors),
    })
}

/// Ranked HS code suggestions. Always 200; empty when the catalog is not
/// ready or the query carries no text.
pub async fn suggest_hs(
    State(state): State<AppState>,
    Json(query): Json<FreeTextQuery>,
) -> Json<SuggestResponse> {
    let request_id = Uuid::new_v4();
    let span = info_span!("suggest_hs", %request_id);

    async move {
        if !state.hs.is_ready() {
            warn!("HS suggest called but model unavailable");
            return Json(SuggestResponse::default());
        }

        let k = query.limit();
        let fields = vec![query.name, query.category, query.description];
        let matches = state.hs.search_blocking(fields, k).await;
        info!(k, returned = matches.len(), "suggestions served");

        Json(SuggestResponse::from(matches))
    }
    .instrument(span)
    .await
}

/// Hybrid document recommendation. 400 when no signal field is set.
pub async fn predict_documents(
    State(state): State<AppState>,
    Json(query): Json<StructuredQuery>,
) -> Result<Json<Recommendation>, RecommenderError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("predict_documents", %request_id);

    async move {
        info!(
            origin = %query.origin_country,
            dest = %query.destination_country,
            hs = %query.hs_code,
            category = %query.product_category,
            "document prediction request"
        );

        let recommendation = state.scorer.recommend_blocking(query).await?;
        Ok(Json(recommendation))
    }
    .instrument(span)
    .await
}
