//! toth-api - HTTP API for documents, CCPs, evaluations and document files.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use toth_core::{CcpRepository, DocumentRepository, Error, EvaluationRepository, Result};
use toth_db::{Database, DocumentFileStorage};

pub use error::ApiError;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<dyn DocumentRepository>,
    pub ccps: Arc<dyn CcpRepository>,
    pub evaluations: Arc<dyn EvaluationRepository>,
    pub files: DocumentFileStorage,
}

impl AppState {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        ccps: Arc<dyn CcpRepository>,
        evaluations: Arc<dyn EvaluationRepository>,
        files: DocumentFileStorage,
    ) -> Self {
        Self {
            documents,
            ccps,
            evaluations,
            files,
        }
    }

    /// Build state from a database whose file storage has been configured.
    pub fn from_database(db: &Database) -> Result<Self> {
        let files = db.file_storage.clone().ok_or_else(|| {
            Error::Config("file storage must be configured before serving".to_string())
        })?;
        Ok(Self::new(
            db.documents.clone(),
            db.ccps.clone(),
            db.evaluations.clone(),
            files,
        ))
    }
}

/// Assemble the full router with tracing, request ids, CORS and body limits.
pub fn build_router(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let body_limit = state
        .files
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            handlers::X_TOTAL_COUNT,
            header::LINK,
            header::LOCATION,
            header::CONTENT_DISPOSITION,
        ])
        .max_age(std::time::Duration::from_secs(3600));

    api_routes()
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::{ccps, documents, evaluations, health};

    Router::new()
        .route("/health", get(health::health_check))
        // Documents
        .route(
            "/api/documents",
            get(documents::list_documents)
                .post(documents::create_document)
                .put(documents::update_document),
        )
        .route(
            "/api/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/api/documents/:id/upload", post(documents::upload_file))
        .route("/api/documents/:id/download", get(documents::download_file))
        // CCPs
        .route(
            "/api/ccps",
            get(ccps::list_ccps)
                .post(ccps::create_ccp)
                .put(ccps::update_ccp),
        )
        .route("/api/ccps/:id", get(ccps::get_ccp).delete(ccps::delete_ccp))
        // Evaluations
        .route(
            "/api/evaluations",
            get(evaluations::list_evaluations)
                .post(evaluations::create_evaluation)
                .put(evaluations::update_evaluation),
        )
        .route(
            "/api/evaluations/:id",
            get(evaluations::get_evaluation).delete(evaluations::delete_evaluation),
        )
}
