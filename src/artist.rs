use crate::ExternalUrls;
use crate::Image;
use crate::deserialize_null_default;
use serde::{Deserialize, Serialize};

/// Represents an artist from the Spotify catalog.
///
/// Search results carry the full artist object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Artist {
    /// Spotify ID of the artist
    pub id: String,
    /// Artist name
    pub name: String,
    /// Spotify URI of the artist
    pub uri: String,
    /// Genres the artist is associated with
    #[serde(deserialize_with = "deserialize_null_default")]
    pub genres: Vec<String>,
    /// Artist images, widest first
    #[serde(deserialize_with = "deserialize_null_default")]
    pub images: Vec<Image>,
    /// Popularity score for the artist (0-100)
    pub popularity: Option<u32>,
    /// Known external URLs for the artist
    pub external_urls: ExternalUrls,
}

impl Artist {
    /// Widest available artist image.
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|image| image.url.as_str())
    }
}

/// A simplified representation of an artist used in track and album listings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ArtistSummary {
    /// Spotify ID of the artist, absent for local files
    pub id: Option<String>,
    /// Artist name
    pub name: String,
    /// Spotify URI of the artist
    pub uri: Option<String>,
    /// Known external URLs for the artist
    pub external_urls: ExternalUrls,
}
