use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

use crate::{
    VERSION, WindRouteError,
    analysis::{self, RouteAnalysisService},
    config::WindRouteConfig,
    models::{AnalysisRequest, AnalysisResponse, ParseResponse},
    track::decode_gpx,
};

/// Multipart field carrying the uploaded track
pub const GPX_FIELD: &str = "gpx";

/// Shared state of the API handlers
pub struct AppState {
    pub config: WindRouteConfig,
    pub service: RouteAnalysisService,
}

/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Handler error, rendered as a failed envelope
#[derive(Debug)]
pub struct ApiError(pub WindRouteError);

impl From<WindRouteError> for ApiError {
    fn from(err: WindRouteError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind
#[must_use]
pub fn status_for(err: &WindRouteError) -> StatusCode {
    match err {
        WindRouteError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        WindRouteError::InvalidInput { .. } | WindRouteError::OutOfRangeDateTime { .. } => {
            StatusCode::BAD_REQUEST
        }
        WindRouteError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        WindRouteError::Config { .. } | WindRouteError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = Envelope::<()> {
            success: false,
            data: None,
            error: Some(self.0.user_message()),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.server.max_upload_bytes();

    Router::new()
        .route("/parse", post(parse_gpx))
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .with_state(state)
}

fn has_gpx_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"))
}

async fn parse_gpx(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<ParseResponse> {
    let invalid_form = |e: MultipartError| WindRouteError::invalid_input(format!("Invalid upload: {e}"));

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        if field.name() != Some(GPX_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        if !file_name.as_deref().is_some_and(has_gpx_extension) {
            return Err(WindRouteError::invalid_input("Only .gpx files are accepted").into());
        }

        let bytes = field.bytes().await.map_err(invalid_form)?;
        let content = decode_gpx(&bytes)?;

        info!(
            "Received GPX upload {:?} ({} bytes)",
            file_name.as_deref().unwrap_or("-"),
            content.len()
        );
        let parsed = analysis::parse_track(file_name.as_deref(), &content, &state.config.analysis)?;
        return Ok(Json(Envelope::ok(parsed)));
    }

    Err(WindRouteError::invalid_input("No GPX file uploaded").into())
}

async fn analyze(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<AnalysisResponse> {
    let request: AnalysisRequest = serde_json::from_slice(&body)
        .map_err(|e| WindRouteError::invalid_input(format!("Invalid analysis request: {e}")))?;

    let response = state.service.analyze(&request).await?;
    info!(
        "Analyzed {} segments, best direction {}",
        response.segments.len(),
        response.summary.best_direction
    );
    Ok(Json(Envelope::ok(response)))
}

async fn health() -> Json<Envelope<HealthStatus>> {
    Json(Envelope::ok(HealthStatus {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    }))
}
