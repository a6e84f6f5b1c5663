use axum::{
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cache;
mod codec;
mod config;
mod errors;
mod handlers;
mod models;
mod render;
mod share;

use config::Config;
use handlers::{og, sharing};
use render::Assets;
use share::{ComposeAction, HttpComposeAction};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub assets: &'static Assets,
    pub compose: Arc<dyn ComposeAction>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zerox_share=info,tower_http=info,info")),
        )
        .init();

    let config = Config::from_env()?;

    // Fonts and logo are loaded once and shared read-only
    let assets = render::init_assets(&config);

    let compose = HttpComposeAction::new(config.compose_url.clone(), config.share_confirm_timeout)?;
    if config.compose_url.is_none() {
        warn!("⚠️ COMPOSE_URL not set, shares will fall back to the clipboard");
    }

    let state = AppState {
        config: Arc::new(config),
        assets,
        compose: Arc::new(compose),
    };

    let app = app(state.clone(), api_cors(&state.config));

    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port).parse()?;
    info!("🚀 Server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState, cors: CorsLayer) -> Router {
    // Card image and share page are fetched by crawlers from anywhere
    let public_routes = Router::new()
        .merge(og::router())
        .merge(sharing::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/share", sharing::api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    public_routes.merge(api_routes)
}

/// Permissive in debug mode, otherwise limited to ALLOWED_ORIGINS.
fn api_cors(config: &Config) -> CorsLayer {
    let cors = if config.debug_mode {
        info!("🔓 Development mode: Using permissive CORS");
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("⚠️ Ignoring invalid origin '{}': {}", origin, e);
                    None
                }
            })
            .collect();

        if origins.is_empty() {
            info!("🔒 No ALLOWED_ORIGINS configured, API is same-origin only");
        } else {
            info!("🔒 CORS configured for {} origin(s)", origins.len());
        }
        CorsLayer::new().allow_origin(origins)
    };

    cors.allow_methods([
        axum::http::Method::GET,
        axum::http::Method::POST,
        axum::http::Method::OPTIONS,
    ])
    .allow_headers([
        axum::http::header::CONTENT_TYPE,
        axum::http::header::ACCEPT,
        axum::http::header::ORIGIN,
    ])
}

async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "zerox-share",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "render_cache": cache::stats(),
        "endpoints": {
            "og": "/og?data=<token>",
            "share": "/share?data=<token>",
            "dispatch": "/api/share",
            "link": "/api/share/link",
            "health": "/api/health"
        }
    })))
}

#[cfg(test)]
pub fn test_state() -> AppState {
    AppState {
        config: Arc::new(Config::default()),
        assets: render::assets(),
        compose: Arc::new(share::MockComposeAction::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_reports_cache_stats() {
        let state = test_state();
        let response = app(state.clone(), api_cors(&state.config))
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["render_cache"]["entry_count"].is_u64());
    }

    #[tokio::test]
    async fn public_routes_are_mounted() {
        let state = test_state();
        let response = app(state.clone(), api_cors(&state.config))
            .oneshot(Request::builder().uri("/og").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
