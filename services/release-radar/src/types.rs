use serde::{Deserialize, Serialize};

use crate::release_date::ReleaseDate;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);

impl std::fmt::Display for ArtistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String
}

// Precision stays raw text, tags outside year/month/day are rejected
// when the date is parsed rather than when the payload is decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub album: Album
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>
}

impl UserProfile {
    /// Spotify leaves display_name null for some accounts
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

/// Body of a successful authorization_code exchange
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// An album that came out inside the recency window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub album_name: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub release_date: ReleaseDate
}

/// Wire shapes of the Spotify list endpoints
#[derive(Debug, Deserialize)]
pub struct FollowedArtistsPage {
    pub artists: Page<Artist>
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>
}

#[derive(Debug, Deserialize)]
pub struct TopTracks {
    pub tracks: Vec<Track>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followed_artists_payload_decodes() {
        let body = r#"{
            "artists": {
                "items": [
                    {"id": "0OdUWJ0sBjDrqHygGUXeCF", "name": "Band of Horses",
                     "genres": ["indie"], "popularity": 59, "type": "artist"}
                ],
                "next": null,
                "total": 1,
                "cursors": {"after": null}
            }
        }"#;
        let page: FollowedArtistsPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.artists.items.len(), 1);
        assert_eq!(page.artists.items[0].id, ArtistId("0OdUWJ0sBjDrqHygGUXeCF".into()));
        assert!(page.artists.next.is_none());
    }

    #[test]
    fn top_tracks_payload_keeps_album_precision() {
        let body = r#"{
            "tracks": [{
                "id": "6GtOsEzNUhJghrIf6UTbRV",
                "name": "Breathe Deeper",
                "album": {"id": "79dL7FLiJFOO0EoehUHQBv", "name": "The Slow Rush",
                          "release_date": "2020-02-14", "release_date_precision": "day"}
            }]
        }"#;
        let top: TopTracks = serde_json::from_str(body).unwrap();
        assert_eq!(top.tracks[0].album.release_date_precision, "day");
        assert_eq!(top.tracks[0].album.name, "The Slow Rush");
    }

    #[test]
    fn profile_without_display_name_falls_back_to_id() {
        let user: UserProfile = serde_json::from_str(
            r#"{"id": "wizzler", "display_name": null}"#
        ).unwrap();
        assert_eq!(user.label(), "wizzler");
        assert!(user.email.is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token: AccessToken = serde_json::from_str(
            r#"{"access_token": "BQD-secret", "token_type": "Bearer", "expires_in": 3600}"#
        ).unwrap();
        assert!(!format!("{token:?}").contains("BQD-secret"));
    }
}
