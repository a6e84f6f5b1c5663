use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use maud::{html, PreEscaped, DOCTYPE};
use serde_json::json;
use std::sync::Arc;
use url::Url;

use crate::{
    codec,
    errors::{AppError, Result},
    models::{ShareLinkResponse, ShareQueryParams, ShareRecord},
    render::{display_name, CARD_HEIGHT, CARD_WIDTH},
    share::{share_text, PreparedShare, ResponseClipboard, ShareDispatcher, ShareFailure, ShareOutcome},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/share", get(share_page))
}

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", post(dispatch_share))
        .route("/link", post(create_share_link))
}

/// GET /share?data=<token> - Embed page pointing crawlers at the result card
pub async fn share_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ShareQueryParams>,
) -> Result<Response> {
    let base_url = resolve_base_url(&state, &headers)?;
    let app_url = state.config.app_url.clone().unwrap_or_else(|| base_url.clone());

    let Some(token) = params.data.filter(|data| !data.is_empty()) else {
        let html = generate_error_html(
            &app_url,
            "Missing Share Data",
            "This share link doesn't contain a game result.",
        );
        return Ok(Html(html).into_response());
    };

    let record = match codec::decode(&token) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!("Share page rejected token: {}", e);
            let html = generate_error_html(
                &app_url,
                "Invalid Share Link",
                "This share link is invalid or has been corrupted.",
            );
            return Ok(Html(html).into_response());
        }
    };

    let image_url = format!(
        "{}/og?data={}",
        base_url.as_str().trim_end_matches('/'),
        codec::encode(&record)
    );
    let html = generate_share_html(&record, &image_url, &app_url);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    Ok((headers, Html(html)).into_response())
}

/// POST /api/share - Post a result through the compose action, falling back
/// to handing the share text back for the client clipboard
pub async fn dispatch_share(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(record): Json<ShareRecord>,
) -> Result<Response> {
    let base_url = resolve_base_url(&state, &headers)?;
    let share = PreparedShare::new(&base_url, &record);

    let clipboard = Arc::new(ResponseClipboard::default());
    let dispatcher = ShareDispatcher::compose_then_clipboard(
        state.compose.clone(),
        clipboard.clone(),
        state.config.share_confirm_timeout,
    );

    match dispatcher.dispatch(&share).await {
        Ok(ShareOutcome::Cast { hash }) => Ok(Json(json!({
            "status": "shared",
            "hash": hash,
            "url": share.url,
        }))
        .into_response()),
        Err(ShareFailure::CopiedToClipboard { reason }) => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "status": "copied",
                "reason": format!("Copied to clipboard - {}", reason),
                "text": clipboard.take().unwrap_or_else(|| share.clipboard_text()),
                "url": share.url,
            })),
        )
            .into_response()),
        Err(failure) => Err(AppError::Share(failure)),
    }
}

/// POST /api/share/link - Build the outbound share link for a result
pub async fn create_share_link(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(record): Json<ShareRecord>,
) -> Result<Json<ShareLinkResponse>> {
    let base_url = resolve_base_url(&state, &headers)?;
    let share = PreparedShare::new(&base_url, &record);

    Ok(Json(ShareLinkResponse {
        token: codec::encode(&record),
        url: share.url,
        text: share.text,
    }))
}

/// Configured public origin, else the origin the request came in on.
/// Forwarded headers are only read when the deployment trusts its proxy.
fn resolve_base_url(state: &AppState, headers: &HeaderMap) -> Result<Url> {
    if let Some(url) = &state.config.public_url {
        return Ok(url.clone());
    }

    let forwarded = |name: &str| {
        headers
            .get(name)
            .filter(|_| state.config.trust_proxy_headers)
            .and_then(|h| h.to_str().ok())
    };

    let host = forwarded("x-forwarded-host")
        .or_else(|| headers.get(header::HOST).and_then(|h| h.to_str().ok()))
        .ok_or_else(|| AppError::BadRequest("Missing Host header".to_string()))?;
    let scheme = forwarded("x-forwarded-proto")
        .filter(|p| *p == "https" || *p == "http")
        .unwrap_or("http");

    Url::parse(&format!("{}://{}", scheme, host))
        .map_err(|_| AppError::BadRequest(format!("Invalid Host header: {}", host)))
}

const SHARE_STYLE: &str = "
    body {
        font-family: Arial, sans-serif;
        max-width: 800px;
        margin: 0 auto;
        padding: 20px;
        background-color: #000000;
        color: #FFFFFF;
        text-align: center;
    }
    .card-image {
        width: 100%;
        border-radius: 24px;
        border: 2px solid #70FF5A;
    }
    .redirect-notice {
        margin-top: 20px;
        color: #70FF5A;
    }
";

const ERROR_STYLE: &str = "
    body {
        font-family: Arial, sans-serif;
        max-width: 600px;
        margin: 50px auto;
        padding: 20px;
        text-align: center;
        background-color: #000000;
        color: #FFFFFF;
    }
    .error-title {
        font-size: 24px;
        color: #f44336;
        margin-bottom: 15px;
    }
    .error-message {
        font-size: 16px;
        margin-bottom: 20px;
    }
";

/// `content` value of a meta refresh that sends the visitor to the game.
fn refresh_to(app_url: &Url, delay_secs: u32) -> String {
    format!("{};url={}", delay_secs, app_url)
}

fn generate_share_html(record: &ShareRecord, image_url: &str, app_url: &Url) -> String {
    let player = display_name(record.player_name.as_deref(), "Player");
    let opponent = display_name(record.opponent_name.as_deref(), "Opponent");
    let title = format!("{} vs {} • {}", player, opponent, record.result.headline());
    let description = share_text(record).replace('\n', " ");

    let embed = json!({
        "version": "1",
        "imageUrl": image_url,
        "button": {
            "title": "🎮 Play ZeroX",
            "action": {
                "type": "launch_miniapp",
                "name": "ZeroX TicTacToe",
                "url": app_url.as_str(),
            }
        }
    });

    // Crawlers scrape the meta tags, browsers follow the refresh to the game
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }

                meta property="og:type" content="website";
                meta property="og:title" content=(title);
                meta property="og:description" content=(description);
                meta property="og:image" content=(image_url);
                meta property="og:image:width" content=(CARD_WIDTH);
                meta property="og:image:height" content=(CARD_HEIGHT);
                meta property="og:site_name" content="ZeroX TicTacToe";

                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(title);
                meta name="twitter:description" content=(description);
                meta name="twitter:image" content=(image_url);

                meta name="fc:miniapp" content=(embed.to_string());

                meta http-equiv="refresh" content=(refresh_to(app_url, 2));
                style { (PreEscaped(SHARE_STYLE)) }
            }
            body {
                img class="card-image" src=(image_url) alt=(title);
                div class="redirect-notice" { "Taking you to the game in a moment..." }
            }
        }
    }
    .into_string()
}

fn generate_error_html(app_url: &Url, title: &str, message: &str) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta http-equiv="refresh" content=(refresh_to(app_url, 3));
                style { (PreEscaped(ERROR_STYLE)) }
            }
            body {
                div class="error-title" { (title) }
                div class="error-message" { (message) }
                div { "Redirecting to the game in a moment..." }
            }
        }
    }
    .into_string()
}
