// Analytics Audit - HTTP surface
// GET /run-audit?property_id=..&start_date=..&end_date=..

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AuditConfig;
use crate::replay::ReplaySource;
use crate::report::AuditReport;
use crate::service::{run_audit_safely, ApiResponse, AuditRequest};
use crate::source::{AdminSource, ReportSource};

/// A source that answers both report and admin calls
pub trait PropertySource: Send + Sync {
    fn reports(&self) -> &dyn ReportSource;
    fn admin(&self) -> &dyn AdminSource;
}

impl<T: ReportSource + AdminSource + Send + Sync> PropertySource for T {
    fn reports(&self) -> &dyn ReportSource {
        self
    }

    fn admin(&self) -> &dyn AdminSource {
        self
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PropertySource>,
    pub config: Arc<AuditConfig>,
}

impl AppState {
    pub fn new(source: Arc<dyn PropertySource>, config: AuditConfig) -> Self {
        AppState {
            source,
            config: Arc::new(config),
        }
    }

    /// State backed by the configured replay fixture
    pub fn from_config(config: AuditConfig) -> anyhow::Result<Self> {
        let fixture = config
            .fixture
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no fixture configured (set AUDIT_FIXTURE)"))?;
        let source = ReplaySource::from_file(fixture)?;
        Ok(AppState::new(Arc::new(source), config))
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditParams {
    pub property_id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
struct RootMessage {
    message: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET / - Liveness message
async fn root() -> impl IntoResponse {
    Json(RootMessage {
        message: "Analytics audit API is running",
    })
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /run-audit - Run one audit; failures come back as `success: false`
async fn run_audit(State(state): State<AppState>, Query(params): Query<AuditParams>) -> impl IntoResponse {
    let request = AuditRequest::new(params.property_id, params.start_date, params.end_date, &state.config);

    let source = state.source.clone();
    let config = state.config.clone();
    let task = tokio::task::spawn_blocking(move || {
        run_audit_safely(source.reports(), source.admin(), &config, &request)
    });

    let response: ApiResponse<AuditReport> = match task.await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "audit task aborted");
            ApiResponse::failure(format!("audit task aborted: {}", e))
        }
    };

    Json(response)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/run-audit", get(run_audit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================
