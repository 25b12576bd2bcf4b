//!
//! src/api.rs
//!
//! HTTP surface: landing page, login redirect, oauth callback and health
//!

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::auth::Authenticator;
use crate::catalog::CatalogConnector;
use crate::config::ScanConfig;
use crate::recency::RecencyWindow;
use crate::render;
use crate::scanner;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn Authenticator>,
    pub catalog: Arc<dyn CatalogConnector>,
    pub scan: ScanConfig,
    /// Source of `now` for the recency window
    pub clock: fn() -> DateTime<Utc>
}

impl AppState {
    pub fn new(
        auth: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogConnector>,
        scan: ScanConfig
    ) -> Self {
        Self { auth, catalog, scan, clock: Utc::now }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/health", get(health_check))
        .with_state(state)
}

fn plain(status: StatusCode, message: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message).into_response()
}

/// GET /
pub async fn index() -> Html<String> {
    Html(render::landing_page())
}

/// GET /login
///
/// 302 to the Spotify consent screen
pub async fn login(State(state): State<AppState>) -> Response {
    let url = state.auth.authorization_url();
    (StatusCode::FOUND, [(header::LOCATION, url.to_string())]).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>
}

/// GET /callback?code=...
///
/// Exchanges the code, scans every followed artist and renders the results.
/// Auth and top level catalog failures end the request, per artist failures
/// only drop that artist.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>
) -> Response {
    let span = info_span!("callback", request_id = %Uuid::new_v4());
    handle_callback(state, query).instrument(span).await
}

async fn handle_callback(state: AppState, query: CallbackQuery) -> Response {
    if let Some(denied) = query.error {
        warn!(reason = %denied, "auth.denied");
        return plain(StatusCode::UNAUTHORIZED, format!("Authorization denied: {denied}"));
    }
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return plain(StatusCode::BAD_REQUEST, "Missing authorization code".to_string());
    };

    let token = match state.auth.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "auth.exchange.failed");
            return plain(StatusCode::UNAUTHORIZED, format!("Error getting access token: {e}"));
        }
    };

    let catalog = state.catalog.connect(&token);

    let user = match catalog.current_user().await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "catalog.user.failed");
            return plain(StatusCode::BAD_GATEWAY, format!("Error getting user info: {e}"));
        }
    };

    let artists = match catalog.followed_artists().await {
        Ok(artists) => artists,
        Err(e) => {
            error!(error = %e, "catalog.followed.failed");
            return plain(
                StatusCode::BAD_GATEWAY,
                format!("Error getting followed artists: {e}")
            );
        }
    };

    let window = RecencyWindow::new((state.clock)(), state.scan.window);
    let report = scanner::scan_all(&artists, catalog.as_ref(), &state.scan.market, &window).await;

    info!(
        user = %user.id,
        artists = artists.len(),
        with_news = report.with_news().count(),
        failed = report.failures.len(),
        skipped_items = report.diagnostic_count(),
        since = ?window.start(),
        "scan.done"
    );

    Html(render::results_page(&user, &report, state.scan.window.num_days())).into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string()
    })
}
