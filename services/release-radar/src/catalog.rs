//!
//! src/catalog.rs
//!
//! Seam between the release scan and the music catalog. The Spotify client
//! implements these traits, tests substitute in-memory catalogs
//!

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::RadarError;
use crate::types::{AccessToken, Album, Artist, ArtistId, Track, UserProfile};

/// Catalog session already bound to one user's access token
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn current_user(&self) -> Result<UserProfile, RadarError>;

    /// First page of followed artists only
    async fn followed_artists(&self) -> Result<Vec<Artist>, RadarError>;

    async fn artist_albums(&self, artist_id: &ArtistId) -> Result<Vec<Album>, RadarError>;

    async fn artist_top_tracks(
        &self,
        artist_id: &ArtistId,
        region: &str
    ) -> Result<Vec<Track>, RadarError>;
}

/// Opens a catalog session for a freshly exchanged token
pub trait CatalogConnector: Send + Sync {
    fn connect(&self, token: &AccessToken) -> Arc<dyn CatalogClient>;
}

#[cfg(test)]
pub mod mocks {
    use std::collections::HashMap;

    use super::*;

    pub fn album(name: &str, date: &str, precision: &str) -> Album {
        Album {
            id: None,
            name: name.to_string(),
            release_date: date.to_string(),
            release_date_precision: precision.to_string()
        }
    }

    pub fn track(name: &str, album: Album) -> Track {
        Track { id: None, name: name.to_string(), album }
    }

    pub fn artist(id: &str, name: &str) -> Artist {
        Artist { id: ArtistId(id.to_string()), name: name.to_string() }
    }

    /// In-memory catalog, artists listed in `failing` error on every call
    #[derive(Clone, Default)]
    pub struct MockCatalog {
        pub user: Option<UserProfile>,
        pub followed: Vec<Artist>,
        pub albums: HashMap<String, Vec<Album>>,
        pub top_tracks: HashMap<String, Vec<Track>>,
        pub failing: Vec<String>,
        pub fail_followed: bool
    }

    impl MockCatalog {
        pub fn with_artist(mut self, artist: Artist, albums: Vec<Album>, tracks: Vec<Track>) -> Self {
            self.albums.insert(artist.id.0.clone(), albums);
            self.top_tracks.insert(artist.id.0.clone(), tracks);
            self.followed.push(artist);
            self
        }

        pub fn failing_for(mut self, artist_id: &str) -> Self {
            self.failing.push(artist_id.to_string());
            self
        }

        fn check(&self, artist_id: &ArtistId) -> Result<(), RadarError> {
            if self.failing.contains(&artist_id.0) {
                Err(RadarError::Http(format!("simulated failure for {artist_id}")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CatalogClient for MockCatalog {
        async fn current_user(&self) -> Result<UserProfile, RadarError> {
            self.user.clone()
                .ok_or_else(|| RadarError::Catalog("no user".to_string()))
        }

        async fn followed_artists(&self) -> Result<Vec<Artist>, RadarError> {
            if self.fail_followed {
                return Err(RadarError::Http("simulated failure for me/following".to_string()));
            }
            Ok(self.followed.clone())
        }

        async fn artist_albums(&self, artist_id: &ArtistId) -> Result<Vec<Album>, RadarError> {
            self.check(artist_id)?;
            Ok(self.albums.get(&artist_id.0).cloned().unwrap_or_default())
        }

        async fn artist_top_tracks(
            &self,
            artist_id: &ArtistId,
            _region: &str
        ) -> Result<Vec<Track>, RadarError> {
            self.check(artist_id)?;
            Ok(self.top_tracks.get(&artist_id.0).cloned().unwrap_or_default())
        }
    }

    impl CatalogConnector for MockCatalog {
        fn connect(&self, _token: &AccessToken) -> Arc<dyn CatalogClient> {
            Arc::new(self.clone())
        }
    }
}
