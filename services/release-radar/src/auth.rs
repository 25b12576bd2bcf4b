//!
//! src/auth.rs
//!
//! Authorization code flow against the Spotify accounts service
//!

use async_trait::async_trait;
use url::Url;

use crate::errors::RadarError;
use crate::fetch::{SpotifyClient, send_json};
use crate::types::AccessToken;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Where /login sends the browser
    fn authorization_url(&self) -> Url;

    /// Trade the code handed to /callback for an access token
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, RadarError>;
}

#[async_trait]
impl Authenticator for SpotifyClient {
    fn authorization_url(&self) -> Url {
        self.authorize_url()
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, RadarError> {
        if code.trim().is_empty() {
            return Err(RadarError::Auth("missing authorization code".to_string()));
        }

        let token: AccessToken = send_json("POST token", self.token_request(code))
            .await
            .map_err(|e| RadarError::Auth(format!("error exchanging code for token: {e}")))?;

        if !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(RadarError::Auth(
                format!("unexpected token type {}", token.token_type)
            ));
        }

        tracing::debug!(expires_in = ?token.expires_in, scope = ?token.scope, "auth.token");
        Ok(token)
    }
}
