use crate::Error;
use crate::Response;
use crate::SPOTIFY_API_BASE_URL;
use crate::SearchQuery;
use crate::SearchType;
use crate::SpotifyClient;
use crate::with_query;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, EnumString};

/// Direction for [`SpotifyClient::skip`].
#[derive(Debug, Serialize, Deserialize, EnumString, AsRefStr, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SkipDirection {
    /// Skip to the next track in the queue
    #[default]
    Next,
    /// Go back to the previous track
    Previous,
}

/// Flattened view of the currently playing track.
///
/// Every field is looked up on its own: a payload missing some part of the
/// track still yields the parts that are present.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackSnapshot {
    /// Spotify ID of the track
    pub id: Option<String>,
    /// Track name
    pub name: Option<String>,
    /// Artist names joined with ", "
    pub artists: Option<String>,
    /// open.spotify.com link to the track
    pub link: Option<String>,
    /// Small album cover (third image)
    pub art: Option<String>,
    /// Large album cover (first image)
    pub hq_art: Option<String>,
    /// Whether playback is running; `false` when the payload does not say
    pub playing: bool,
}

impl TrackSnapshot {
    /// Build a snapshot from a raw `/me/player` payload.
    ///
    /// # Example
    ///
    /// ```
    /// use spotrs::TrackSnapshot;
    ///
    /// let payload = serde_json::json!({
    ///     "is_playing": true,
    ///     "item": { "id": "4uLU6hMCjMI75M1A2tKUQC", "name": "Never Gonna Give You Up" }
    /// });
    /// let snapshot = TrackSnapshot::from_playback(&payload);
    /// assert_eq!(snapshot.name.as_deref(), Some("Never Gonna Give You Up"));
    /// assert_eq!(snapshot.art, None);
    /// ```
    pub fn from_playback(payload: &Value) -> Self {
        let text = |pointer: &str| {
            payload
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        let artists = payload
            .pointer("/item/artists")
            .and_then(Value::as_array)
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|artist| artist.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            });

        Self {
            id: text("/item/id"),
            name: text("/item/name"),
            artists,
            link: text("/item/external_urls/spotify"),
            art: text("/item/album/images/2/url"),
            hq_art: text("/item/album/images/0/url"),
            playing: payload
                .get("is_playing")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

impl SpotifyClient {
    /// Get the user's current playback state as raw JSON.
    ///
    /// Returns [`Response::NoContent`] when nothing is playing.
    pub async fn playback(&self) -> Result<Response<Value>, Error> {
        let url = format!("{SPOTIFY_API_BASE_URL}/me/player");
        self.do_request(Method::GET, &url, None, true).await
    }

    /// Get the currently playing track as a [`TrackSnapshot`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example(client: spotrs::SpotifyClient) -> Result<(), spotrs::Error> {
    /// match client.formatted_playback().await? {
    ///     spotrs::Response::Content(track) => println!("{:?} by {:?}", track.name, track.artists),
    ///     spotrs::Response::NoContent => println!("Nothing playing"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn formatted_playback(&self) -> Result<Response<TrackSnapshot>, Error> {
        let playback = self.playback().await?;
        Ok(playback.map(|payload| TrackSnapshot::from_playback(&payload)))
    }

    /// Add a track or episode to the end of the user's queue.
    ///
    /// # Arguments
    ///
    /// * `uri` - Spotify URI, e.g. `spotify:track:4iV5W9uYEdYUVa79Axb7Rh`
    pub async fn add_to_queue(&self, uri: &str) -> Result<Response<Value>, Error> {
        let url = with_query(
            &format!("{SPOTIFY_API_BASE_URL}/me/player/queue"),
            &[("uri", uri)],
        );
        self.do_request(Method::POST, &url, None, true).await
    }

    /// Search for a track and queue the first hit.
    ///
    /// Returns the queued track's URI.
    pub async fn search_and_queue(&self, query: &str) -> Result<String, Error> {
        let mut search = SearchQuery::new(query);
        search.search_types = Some(vec![SearchType::Track]);
        search.limit = Some(1);

        let uri = self
            .search(search)
            .await?
            .into_content()
            .and_then(|results| results.tracks)
            .and_then(|tracks| tracks.items.into_iter().find(|track| !track.uri.is_empty()))
            .map(|track| track.uri)
            .ok_or_else(|| Error::NoSearchResults(query.to_string()))?;

        log::debug!("Queueing {} for \"{}\"", uri, query);
        self.add_to_queue(&uri).await?;
        Ok(uri)
    }

    /// Skip forward to the next track or back to the previous one.
    pub async fn skip(&self, direction: SkipDirection) -> Result<Response<Value>, Error> {
        let url = format!("{SPOTIFY_API_BASE_URL}/me/player/{}", direction.as_ref());
        self.do_request(Method::POST, &url, None, true).await
    }
}
