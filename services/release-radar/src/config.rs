//!
//! src/config.rs
//!
//! Reads the environment (and an optional .env file) once at startup and
//! produces the explicit configuration handed to every client constructor
//!

use std::{net::SocketAddr, time};

use url::Url;

use crate::errors::RadarError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 8000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HTTP_POOL_MAX_IDLE: usize = 16;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Scopes needed to read the profile and the followed artists
pub const SPOTIFY_SCOPES: [&str; 3] = [
    "user-read-private",
    "user-read-email",
    "user-follow-read",
];

/// Source of configuration values, the process environment in production
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Wrapper over a lookup to return a missing variable error
fn env_check(env: Lookup, s: &str) -> Result<String, RadarError> {
    match env(s) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RadarError::Config(format!("{s} was not set"))),
    }
}

fn env_or(env: Lookup, s: &str, default: &str) -> String {
    match env(s) {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

fn parse_url(env: Lookup, var: &str, default: &str) -> Result<Url, RadarError> {
    let raw = env_or(env, var, default);
    Url::parse(&raw).map_err(|e| RadarError::Config(format!("{var} invalid {e}")))
}

/// Configuration that Spotify expects for the authorization code flow and
/// for hitting the web api endpoints
#[derive(Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub api_base: Url,
    pub scopes: Vec<String>,
}

// client_secret stays out of debug output
impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("api_base", &self.api_base.as_str())
            .field("scopes", &self.scopes)
            .finish()
    }
}

fn build_spotify(env: Lookup) -> Result<SpotifyConfig, RadarError> {
    let client_id     = env_check(env, "SPOTIFY_CLIENT_ID")?;
    let client_secret = env_check(env, "SPOTIFY_CLIENT_SECRET")?;

    let redirect_uri = parse_url(env, "SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI)?;
    let auth_url     = parse_url(
        env, "SPOTIFY_AUTH_URL", "https://accounts.spotify.com/authorize"
    )?;
    let token_url    = parse_url(
        env, "SPOTIFY_TOKEN_URL", "https://accounts.spotify.com/api/token"
    )?;
    let mut api_base = parse_url(
        env, "SPOTIFY_API_BASE", "https://api.spotify.com/v1/"
    )?;

    // ensure valid https and hostname for the spotify urls
    for url in [&auth_url, &token_url, &api_base] {
        ensure_https(url).map_err(RadarError::Config)?;
    }
    ensure_host(&auth_url, "accounts.spotify.com").map_err(RadarError::Config)?;
    ensure_host(&token_url, "accounts.spotify.com").map_err(RadarError::Config)?;
    ensure_host(&api_base, "api.spotify.com").map_err(RadarError::Config)?;

    if !api_base.path().ends_with('/') {
        let mut path = api_base.path().to_string();
        path.push('/');
        api_base.set_path(&path);
    }

    let scopes = SPOTIFY_SCOPES.iter().map(|s| s.to_string()).collect();

    Ok( SpotifyConfig {
        client_id, client_secret, redirect_uri, auth_url, token_url, api_base, scopes
    })
}

///
/// Configuration for Http timeouts, pooling, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS,
        }
    }
}

///
/// Configuration for the web server and for the release scan
///
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

fn build_server(env: Lookup) -> Result<ServerConfig, RadarError> {
    let raw = env_or(env, "RADAR_BIND_ADDR", DEFAULT_BIND_ADDR);
    let bind_addr = raw.parse::<SocketAddr>()
        .map_err(|e| RadarError::Config(format!("RADAR_BIND_ADDR invalid {e}")))?;
    Ok( ServerConfig { bind_addr } )
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub market: String,          // region for top tracks
    pub window: chrono::Duration // trailing recency window
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            market: DEFAULT_MARKET.to_string(),
            window: chrono::Duration::days(DEFAULT_WINDOW_DAYS),
        }
    }
}

fn build_scan(env: Lookup) -> Result<ScanConfig, RadarError> {
    let market = env_or(env, "RADAR_MARKET", DEFAULT_MARKET).to_ascii_uppercase();
    if market.len() != 2 || !market.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RadarError::Config(format!("RADAR_MARKET invalid {market}")));
    }

    let days = match env("RADAR_WINDOW_DAYS") {
        Some(s) => s.trim().parse::<i64>()
            .ok()
            .filter(|d| (1..=MAX_WINDOW_DAYS).contains(d))
            .ok_or_else(|| RadarError::Config(
                format!("RADAR_WINDOW_DAYS invalid {s}")
            ))?,
        None => DEFAULT_WINDOW_DAYS,
    };

    Ok( ScanConfig { market, window: chrono::Duration::days(days) } )
}

///
/// Configuration for Logger
///
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub include_file_line: bool,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,release_radar=debug,reqwest=warn".to_string(),
            include_file_line: true,
            include_target: true,
        }
    }
}

///
/// AppConfig which holds everything the server and the clients need
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig
}

fn build_config(env: Lookup) -> Result<AppConfig, RadarError> {
    let spotify = build_spotify(env)?;
    let http    = HttpConfig::default();
    let server  = build_server(env)?;
    let scan    = build_scan(env)?;
    let logging = LoggingConfig::default();

    Ok( AppConfig { spotify, http, server, scan, logging } )
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, RadarError> {
    dotenvy::dotenv().ok();
    build_config(&|key| std::env::var(key).ok())
}
