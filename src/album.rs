use crate::ExternalUrls;
use crate::Image;
use crate::artist::ArtistSummary;
use crate::deserialize_null_default;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

/// Types of albums in the Spotify catalog.
#[derive(Default, Debug, Serialize, Deserialize, EnumString, AsRefStr, PartialEq, Eq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlbumType {
    /// Standard album release
    #[default]
    Album,
    /// Single or EP
    Single,
    /// Compilation album
    Compilation,
    /// Any type this library does not know about
    #[serde(other)]
    Unknown,
}

/// A simplified album as embedded in tracks and search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Album {
    /// Spotify ID of the album
    pub id: Option<String>,
    /// Album name
    pub name: String,
    /// Release type of the album
    pub album_type: Option<AlbumType>,
    /// Artists credited on the album
    #[serde(deserialize_with = "deserialize_null_default")]
    pub artists: Vec<ArtistSummary>,
    /// Cover art, widest first
    #[serde(deserialize_with = "deserialize_null_default")]
    pub images: Vec<Image>,
    /// Release date, precision varies (year, month or day)
    pub release_date: Option<String>,
    /// Number of tracks on the album
    pub total_tracks: Option<u32>,
    /// Spotify URI of the album
    pub uri: Option<String>,
    /// Known external URLs for the album
    pub external_urls: ExternalUrls,
}

impl Album {
    /// URL of the widest cover image.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }

    /// URL of the narrowest cover image.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images.last().map(|image| image.url.as_str())
    }
}
