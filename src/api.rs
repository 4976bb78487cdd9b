use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{header::HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::config::ServiceConfig;
use crate::engine::DecisionPipeline;
use crate::error::ClassifyError;
use crate::response::ClassifyResponse;

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<DecisionPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<DecisionPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Full HTTP surface: `/health`, `/predict`, CORS, upload limit, and the static
/// frontend as fallback when its directory exists.
pub fn router(state: AppState, cfg: &ServiceConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/predict", post(predict))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(cors_layer(&cfg.cors_allow_origins))
        .with_state(state);

    if cfg.frontend_dir.is_dir() {
        app = app.fallback_service(ServeDir::new(&cfg.frontend_dir));
    }
    app
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(_) if o == "*" => {
                warn!("ignoring wildcard CORS origin, credentials need explicit origins");
                None
            }
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let mut multipart = multipart.map_err(ApiError::rejected)?;
    let bytes = read_file_field(&mut multipart).await?;

    // CPU-bound inference stays off the async workers.
    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.classify_bytes(&bytes))
        .await
        .map_err(|e| ApiError::Worker(e.to_string()))??;

    Ok(Json(ClassifyResponse::from(&outcome)))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(ApiError::multipart)? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map_err(ApiError::multipart);
        }
    }
    Err(ApiError::MissingFile)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("multipart field `file` is missing")]
    MissingFile,

    #[error("invalid multipart body: {message}")]
    Multipart { status: StatusCode, message: String },

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    fn multipart(e: MultipartError) -> Self {
        Self::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }

    fn rejected(r: MultipartRejection) -> Self {
        Self::Multipart {
            status: r.status(),
            message: r.body_text(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile => StatusCode::BAD_REQUEST,
            Self::Multipart { status, .. } => *status,
            Self::Classify(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Classify(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::Multipart { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "payload_too_large"
            }
            Self::Multipart { .. } => "invalid_multipart",
            Self::Classify(e) => e.kind(),
            Self::Worker(_) => "worker_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
