use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::analysis::RouteAnalysisService;
use crate::api::{self, AppState};
use crate::config::WindRouteConfig;
use crate::weather::OpenMeteoClient;

/// Full application: the API under `/api`, an optional static frontend, CORS and tracing
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.server.static_dir.clone();
    let mut app = Router::new().nest("/api", api::router(state));
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

/// Build the production state: Open-Meteo client behind the analysis service
pub fn build_state(config: WindRouteConfig) -> Result<Arc<AppState>> {
    let client = OpenMeteoClient::new(&config.weather)?;
    let service = RouteAnalysisService::new(Arc::new(client), &config)?;
    Ok(Arc::new(AppState { config, service }))
}

pub async fn run(config: WindRouteConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = app(build_state(config)?);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .with_context(|| "Web server stopped unexpectedly")?;
    Ok(())
}
