use crate::ExternalUrls;
use crate::album::Album;
use crate::artist::ArtistSummary;
use crate::deserialize_null_default;
use serde::{Deserialize, Serialize};

/// Represents a track from the Spotify catalog.
///
/// Fields Spotify omits or nulls (local files, relinked tracks) fall back to
/// their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Track {
    /// Spotify ID of the track, absent for local files
    pub id: Option<String>,
    /// Track name
    pub name: String,
    /// Spotify URI, used to queue the track
    pub uri: String,
    /// Artists who performed the track
    #[serde(deserialize_with = "deserialize_null_default")]
    pub artists: Vec<ArtistSummary>,
    /// Album the track appears on
    pub album: Option<Album>,
    /// Track length in milliseconds
    pub duration_ms: u64,
    /// Whether the track has explicit lyrics
    pub explicit: bool,
    /// Popularity score for the track (0-100)
    pub popularity: Option<u32>,
    /// Position on its disc
    pub track_number: Option<u32>,
    /// Whether the track is a local file
    pub is_local: bool,
    /// Known external URLs for the track
    pub external_urls: ExternalUrls,
}

impl Track {
    /// Artist names joined with ", ".
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
