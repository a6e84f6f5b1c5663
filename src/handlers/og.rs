use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::{
    cache, codec,
    errors::{AppError, Result},
    models::ShareQueryParams,
    render::{render_card, RenderError},
    AppState,
};

const CACHE_CONTROL: &str = "public, max-age=31536000, s-maxage=31536000, immutable";

pub fn router() -> Router<AppState> {
    Router::new().route("/og", get(og_image))
}

/// GET /og?data=<token> - Render the result card for a share token
pub async fn og_image(
    State(state): State<AppState>,
    Query(params): Query<ShareQueryParams>,
) -> Result<Response> {
    let token = params
        .data
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::Image("No share data provided".to_string()))?;

    if let Some(png) = cache::get(&token) {
        return Ok(png_response(png));
    }

    let record = codec::decode(&token).map_err(|e| AppError::Image(e.to_string()))?;

    let assets = state.assets;
    let png = tokio::task::spawn_blocking(move || render_card(&record, assets))
        .await
        .map_err(|e| RenderError::Task(e.to_string()))
        .and_then(|rendered| rendered)
        .map_err(|e| AppError::Image(e.to_string()))?;

    let png = Bytes::from(png);
    cache::set(&token, png.clone(), state.config.render_cache_ttl);

    Ok(png_response(png))
}

fn png_response(png: Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        png,
    )
        .into_response()
}
