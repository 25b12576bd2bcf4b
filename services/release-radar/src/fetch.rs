//!
//! src/fetch.rs
//!
//! Defines methods for hitting the Spotify accounts and web api endpoints
//! and decoding their json bodies. No retries, every call is bounded by the
//! client timeouts in HttpConfig
//!

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, header, redirect, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::{CatalogClient, CatalogConnector};
use crate::config::{HttpConfig, SpotifyConfig};
use crate::errors::RadarError;
use crate::types::{
    AccessToken, Album, Artist, ArtistId, FollowedArtistsPage, Page, TopTracks, Track,
    UserProfile
};

/// Followed artists beyond the first page are not fetched
pub const FOLLOWED_PAGE_LIMIT: u32 = 50;
pub const ALBUM_PAGE_LIMIT: u32 = 50;

/// Longest slice of an error body copied into an error message
const ERROR_BODY_MAX: usize = 300;

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder  {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

fn client_with_headers(http: &HttpConfig, headers: header::HeaderMap) ->
    Result<Client, RadarError> {
    client_helper(http)
        .default_headers(headers)
        .user_agent(concat!("release-radar/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RadarError::Http(format!("build client: {e}")))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, RadarError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_with_headers(http, h)
}

/// Sends the request and decodes a successful json body. Non-2xx statuses
/// become `RadarError::Http` carrying the status and the head of the body
pub async fn send_json<T: DeserializeOwned>(
    what: &str,
    request: RequestBuilder
) -> Result<T, RadarError> {
    let resp = request.send().await
        .map_err(|e| RadarError::Http(format!("{what}: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(ERROR_BODY_MAX).collect();
        tracing::warn!(what, status = %status, "http.status");
        return Err(RadarError::Http(format!("{what}: {status} {snippet}")));
    }

    let bytes = resp.bytes().await
        .map_err(|e| RadarError::Http(format!("{what}: {e}")))?;
    serde_json::from_slice::<T>(&bytes)
        .map_err(|e| RadarError::Parse(format!("{what}: {e}")))
}

#[derive(Clone, Debug)]
pub struct SpotifyClient {
    pub http: Client,
    pub cfg: SpotifyConfig
}

impl SpotifyClient {
    pub fn new(http_config: &HttpConfig, cfg: &SpotifyConfig) ->
        Result<Self, RadarError> {

        let http = base_client(http_config)?;
        Ok( Self {
            http,
            cfg: cfg.clone()
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RadarError> {
        let mut url = self.cfg.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| RadarError::Config(
                format!("api base cannot hold a path: {}", self.cfg.api_base)
            ))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET https://accounts.spotify.com/authorize?response_type=code&...
    pub fn authorize_url(&self) -> Url {
        let mut url = self.cfg.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.cfg.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", self.cfg.redirect_uri.as_str())
            .append_pair("scope", &self.cfg.scopes.join(" "));
        url
    }

    /// POST /api/token  grant_type=authorization_code
    pub fn token_request(&self, code: &str) -> RequestBuilder {
        self.http
            .post(self.cfg.token_url.clone())
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.cfg.redirect_uri.as_str())
            ])
    }

    /// GET /v1/me
    pub fn me(&self, bearer: &str) -> Result<RequestBuilder, RadarError> {
        let url = self.endpoint(&["me"])?;
        Ok(self.http.get(url).bearer_auth(bearer))
    }

    /// GET /v1/me/following?type=artist&limit=
    pub fn followed_artists(&self, bearer: &str) -> Result<RequestBuilder, RadarError> {
        let url = self.endpoint(&["me", "following"])?;
        Ok(self.http.get(url).bearer_auth(bearer).query(&[
            ("type", "artist"),
            ("limit", &FOLLOWED_PAGE_LIMIT.to_string())
        ]))
    }

    /// GET /v1/artists/{id}/albums?limit=
    pub fn artist_albums(&self, artist_id: &str, bearer: &str) ->
        Result<RequestBuilder, RadarError> {
        let url = self.endpoint(&["artists", artist_id, "albums"])?;
        Ok(self.http.get(url).bearer_auth(bearer).query(&[
            ("limit", &ALBUM_PAGE_LIMIT.to_string())
        ]))
    }

    /// GET /v1/artists/{id}/top-tracks?market=
    pub fn artist_top_tracks(&self, artist_id: &str, market: &str, bearer: &str) ->
        Result<RequestBuilder, RadarError> {
        let url = self.endpoint(&["artists", artist_id, "top-tracks"])?;
        Ok(self.http.get(url).bearer_auth(bearer).query(&[("market", market)]))
    }

    pub fn session(&self, token: &AccessToken) -> SpotifySession {
        SpotifySession {
            client: self.clone(),
            bearer: token.access_token.clone()
        }
    }
}

impl CatalogConnector for SpotifyClient {
    fn connect(&self, token: &AccessToken) -> Arc<dyn CatalogClient> {
        Arc::new(self.session(token))
    }
}

/// Spotify client bound to one user's bearer token for a single request
#[derive(Clone)]
pub struct SpotifySession {
    client: SpotifyClient,
    bearer: String
}

impl SpotifySession {
    /// Any failed catalog call surfaces as `RadarError::Catalog`
    async fn fetch<T: DeserializeOwned>(
        &self,
        what: &str,
        request: Result<RequestBuilder, RadarError>
    ) -> Result<T, RadarError> {
        let result = match request {
            Ok(request) => send_json(what, request).await,
            Err(e) => Err(e)
        };
        result.map_err(|e| match e {
            RadarError::Catalog(_) => e,
            other => RadarError::Catalog(other.to_string())
        })
    }
}

#[async_trait]
impl CatalogClient for SpotifySession {
    async fn current_user(&self) -> Result<UserProfile, RadarError> {
        self.fetch("GET me", self.client.me(&self.bearer)).await
    }

    async fn followed_artists(&self) -> Result<Vec<Artist>, RadarError> {
        let page: FollowedArtistsPage = self.fetch(
            "GET me/following",
            self.client.followed_artists(&self.bearer)
        ).await?;
        if page.artists.next.is_some() {
            tracing::debug!(
                shown = page.artists.items.len(),
                "followed.truncated"
            );
        }
        Ok(page.artists.items)
    }

    async fn artist_albums(&self, artist_id: &ArtistId) -> Result<Vec<Album>, RadarError> {
        let page: Page<Album> = self.fetch(
            "GET artists/albums",
            self.client.artist_albums(&artist_id.0, &self.bearer)
        ).await?;
        Ok(page.items)
    }

    async fn artist_top_tracks(
        &self,
        artist_id: &ArtistId,
        region: &str
    ) -> Result<Vec<Track>, RadarError> {
        let top: TopTracks = self.fetch(
            "GET artists/top-tracks",
            self.client.artist_top_tracks(&artist_id.0, region, &self.bearer)
        ).await?;
        Ok(top.tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SPOTIFY_SCOPES, load_config};

    fn test_config() -> SpotifyConfig {
        SpotifyConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: Url::parse("http://localhost:3000/callback").unwrap(),
            auth_url: Url::parse("https://accounts.spotify.com/authorize").unwrap(),
            token_url: Url::parse("https://accounts.spotify.com/api/token").unwrap(),
            api_base: Url::parse("https://api.spotify.com/v1/").unwrap(),
            scopes: SPOTIFY_SCOPES.iter().map(|s| s.to_string()).collect()
        }
    }

    fn client() -> SpotifyClient {
        SpotifyClient::new(&HttpConfig::default(), &test_config()).unwrap()
    }

    fn live() -> bool {
        std::env::var("LIVE_HTTP").ok().as_deref() == Some("1")
    }

    #[test]
    fn authorize_url_carries_code_flow_parameters() {
        let url = client().authorize_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client-id".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(), "http://localhost:3000/callback".into()
        )));
        assert!(pairs.contains(&(
            "scope".into(), "user-read-private user-read-email user-follow-read".into()
        )));
    }

    #[test]
    fn token_request_is_a_basic_auth_form_post() {
        let req = client().token_request("abc123").build().unwrap();
        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), "https://accounts.spotify.com/api/token");

        let auth = req.headers().get(header::AUTHORIZATION).unwrap().to_str().unwrap();
        assert!(auth.starts_with("Basic "));

        let body = std::str::from_utf8(req.body().unwrap().as_bytes().unwrap()).unwrap();
        assert!(body.contains("grant_type=authorization_code"));
        assert!(body.contains("code=abc123"));
        assert!(body.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
    }

    #[test]
    fn catalog_requests_hit_expected_paths() {
        let c = client();

        let req = c.followed_artists("tok").unwrap().build().unwrap();
        assert_eq!(req.url().path(), "/v1/me/following");
        assert_eq!(req.url().query(), Some("type=artist&limit=50"));
        assert_eq!(
            req.headers().get(header::AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer tok"
        );

        let req = c.artist_albums("0OdUWJ0sBjDrqHygGUXeCF", "tok").unwrap().build().unwrap();
        assert_eq!(req.url().path(), "/v1/artists/0OdUWJ0sBjDrqHygGUXeCF/albums");

        let req = c.artist_top_tracks("0OdUWJ0sBjDrqHygGUXeCF", "US", "tok")
            .unwrap().build().unwrap();
        assert_eq!(req.url().path(), "/v1/artists/0OdUWJ0sBjDrqHygGUXeCF/top-tracks");
        assert_eq!(req.url().query(), Some("market=US"));
    }

    #[test]
    fn artist_ids_cannot_escape_their_path_segment() {
        let req = client().artist_albums("../me?x=1", "tok").unwrap().build().unwrap();
        assert!(req.url().path().starts_with("/v1/artists/"));
        assert!(req.url().path().ends_with("/albums"));
        assert_eq!(req.url().query(), Some("limit=50"));
    }

    #[tokio::test]
    async fn session_failures_are_catalog_errors() {
        let mut cfg = test_config();
        // reserved tld, the lookup fails without reaching spotify
        cfg.api_base = Url::parse("https://api.spotify.com.invalid/v1/").unwrap();
        let spotify = SpotifyClient::new(&HttpConfig::default(), &cfg).unwrap();
        let token = AccessToken {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: None,
            scope: None
        };

        let session = spotify.connect(&token);
        let err = session.artist_albums(&ArtistId("a1".to_string())).await.unwrap_err();
        assert!(matches!(err, RadarError::Catalog(_)));
        assert!(err.to_string().contains("GET artists/albums"));
    }

    #[tokio::test]
    async fn spotify_token_endpoint_rejects_bogus_code() -> Result<(), RadarError> {
        if !live() {
            eprintln!("Set LIVE_HTTP=1 to run");
            return Ok(())
        }

        let cfgs = load_config()?;
        let spotify = SpotifyClient::new(&cfgs.http, &cfgs.spotify)?;
        let result: Result<AccessToken, RadarError> = send_json(
            "POST token", spotify.token_request("not-a-real-code")
        ).await;
        assert!(matches!(result, Err(RadarError::Http(_))));
        Ok(())
    }
}
