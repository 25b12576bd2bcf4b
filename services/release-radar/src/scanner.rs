//!
//! src/scanner.rs
//!
//! Finds the releases of followed artists that fall inside the recency
//! window. One bad album or track is skipped with a diagnostic, one failed
//! artist is skipped without touching the others
//!

use tracing::{debug, warn};

use crate::catalog::CatalogClient;
use crate::errors::RadarError;
use crate::recency::RecencyWindow;
use crate::release_date::{DateError, ReleaseDate};
use crate::types::{Album, Artist, Release};

/// Date of one album or track could not be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanItemError {
    pub item: String,
    pub error: DateError
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistScan {
    pub artist: Artist,
    pub releases: Vec<Release>,
    pub newest_top_track: Option<Release>,
    pub diagnostics: Vec<ScanItemError>
}

impl ArtistScan {
    pub fn released_recently(&self) -> bool {
        !self.releases.is_empty()
    }

    pub fn has_news(&self) -> bool {
        self.released_recently() || self.newest_top_track.is_some()
    }
}

#[derive(Debug)]
pub struct ArtistFailure {
    pub artist: Artist,
    pub error: RadarError
}

#[derive(Debug, Default)]
pub struct RadarReport {
    pub scans: Vec<ArtistScan>,
    pub failures: Vec<ArtistFailure>
}

impl RadarReport {
    pub fn with_news(&self) -> impl Iterator<Item = &ArtistScan> {
        self.scans.iter().filter(|s| s.has_news())
    }

    pub fn diagnostic_count(&self) -> usize {
        self.scans.iter().map(|s| s.diagnostics.len()).sum()
    }
}

fn evaluate(
    artist: &Artist,
    album: &Album,
    item: String,
    window: &RecencyWindow,
    diagnostics: &mut Vec<ScanItemError>
) -> Option<Release> {
    match ReleaseDate::parse(&album.release_date, &album.release_date_precision) {
        Ok(date) if window.contains(&date) => Some(Release {
            album_name: album.name.clone(),
            artist_id: artist.id.clone(),
            artist_name: artist.name.clone(),
            release_date: date
        }),
        Ok(_) => None,
        Err(error) => {
            warn!(artist = %artist.id, item = %item, error = %error, "scan.item.skipped");
            diagnostics.push(ScanItemError { item, error });
            None
        }
    }
}

/// Scan one artist's albums and top tracks. A failed catalog call fails the
/// whole artist, unparseable dates only drop the item they belong to.
/// Recent albums already found are discarded when the top tracks call fails.
pub async fn scan(
    artist: &Artist,
    catalog: &dyn CatalogClient,
    region: &str,
    window: &RecencyWindow
) -> Result<ArtistScan, RadarError> {
    let mut diagnostics = Vec::new();

    let albums = catalog.artist_albums(&artist.id).await?;
    let releases: Vec<Release> = albums.iter()
        .filter_map(|album| evaluate(
            artist, album, format!("album {}", album.name), window, &mut diagnostics
        ))
        .collect();

    let tracks = catalog.artist_top_tracks(&artist.id, region).await?;
    let newest_top_track = tracks.iter()
        .find_map(|track| evaluate(
            artist, &track.album, format!("track {}", track.name), window, &mut diagnostics
        ));

    debug!(
        artist = %artist.id,
        albums = albums.len(),
        recent = releases.len(),
        top_track = newest_top_track.is_some(),
        skipped = diagnostics.len(),
        "scan.artist.done"
    );

    Ok( ArtistScan { artist: artist.clone(), releases, newest_top_track, diagnostics } )
}

/// Scan every artist in order, one at a time
pub async fn scan_all(
    artists: &[Artist],
    catalog: &dyn CatalogClient,
    region: &str,
    window: &RecencyWindow
) -> RadarReport {
    let mut report = RadarReport::default();
    for artist in artists {
        match scan(artist, catalog, region, window).await {
            Ok(found) => report.scans.push(found),
            Err(error) => {
                warn!(artist = %artist.id, error = %error, "scan.artist.failed");
                report.failures.push(ArtistFailure { artist: artist.clone(), error });
            }
        }
    }
    report
}
