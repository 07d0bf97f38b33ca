use crate::Error;
use crate::ExternalUrls;
use crate::Image;
use crate::Page;
use crate::Response;
use crate::SPOTIFY_API_BASE_URL;
use crate::SpotifyClient;
use crate::deserialize_null_default;
use crate::track::Track;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A playlist as listed in search results.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlaylistSummary {
    /// Spotify ID of the playlist
    pub id: String,
    /// Playlist name
    pub name: String,
    /// Playlist description, may contain HTML
    pub description: Option<String>,
    /// Information about the playlist owner
    pub owner: PlaylistOwner,
    /// Playlist cover images, widest first
    #[serde(deserialize_with = "deserialize_null_default")]
    pub images: Vec<Image>,
    /// Whether the playlist is public; `None` when Spotify does not say
    pub public: Option<bool>,
    /// Whether other users may modify the playlist
    pub collaborative: bool,
    /// Spotify URI of the playlist
    pub uri: String,
    /// Reference to the playlist's items
    pub tracks: PlaylistTracksRef,
    /// Known external URLs for the playlist
    pub external_urls: ExternalUrls,
}

/// Information about the owner of a playlist.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlaylistOwner {
    pub id: String,
    pub display_name: Option<String>,
}

/// Where to fetch a playlist's items and how many there are.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlaylistTracksRef {
    pub href: String,
    pub total: usize,
}

/// One entry of a playlist.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlaylistItem {
    /// ISO timestamp when the item was added
    pub added_at: Option<String>,
    /// Whether the item is a local file
    pub is_local: bool,
    /// The track; `None` when it was removed from the catalog
    pub track: Option<Track>,
}

impl SpotifyClient {
    /// Get the first page of items in a playlist.
    ///
    /// Longer playlists are not followed; `Page::next` tells whether more exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example(client: spotrs::SpotifyClient) -> Result<(), spotrs::Error> {
    /// if let Some(page) = client.playlist_items("37i9dQZF1DXcBWIGoYBM5M").await?.into_content() {
    ///     for track in page.items.into_iter().filter_map(|item| item.track) {
    ///         println!("{}", track.name);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Response<Page<PlaylistItem>>, Error> {
        let url = format!("{SPOTIFY_API_BASE_URL}/playlists/{playlist_id}/tracks");
        self.do_request(Method::GET, &url, None, true).await
    }

    /// Get the cover images of a playlist, widest first.
    pub async fn playlist_images(&self, playlist_id: &str) -> Result<Response<Vec<Image>>, Error> {
        let url = format!("{SPOTIFY_API_BASE_URL}/playlists/{playlist_id}/images");
        self.do_request(Method::GET, &url, None, true).await
    }
}
