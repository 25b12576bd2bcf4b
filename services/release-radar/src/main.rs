//!
//! src/main.rs
//!
//! Web server that signs a user in with Spotify and lists what the artists
//! they follow released in the last week
//!
//!

mod config;
mod errors;
mod logging;

mod api;
mod auth;
mod catalog;
mod fetch;
mod recency;
mod release_date;
mod render;
mod scanner;
mod types;

use std::sync::Arc;

use crate::errors::RadarError;

#[tokio::main]
async fn main() -> Result<(), RadarError> {
    let cfgs    = config::load_config()?;
    let _logger = logging::init_logging(&cfgs.logging)?;

    tracing::info!(
        service="release-radar",
        version=%env!("CARGO_PKG_VERSION"),
        spotify=?cfgs.spotify,
        "starting"
    );

    let spotify = Arc::new(fetch::SpotifyClient::new(&cfgs.http, &cfgs.spotify)?);
    let state   = api::AppState::new(spotify.clone(), spotify, cfgs.scan.clone());
    let app     = api::build_router(state);

    let listener = tokio::net::TcpListener::bind(cfgs.server.bind_addr).await?;
    tracing::info!(addr = %cfgs.server.bind_addr, "server.start");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!(msg = "shutting server down", "server.signal");
            }
        })
        .await?;

    tracing::info!("server.exit");
    Ok(())
}
