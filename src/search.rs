use crate::Error;
use crate::Page;
use crate::Response;
use crate::SPOTIFY_API_BASE_URL;
use crate::SpotifyClient;
use crate::album::Album;
use crate::artist::Artist;
use crate::playlist::PlaylistSummary;
use crate::track::Track;
use crate::with_query;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, EnumString};

/// Kinds of catalog items a search can return.
#[derive(Debug, Serialize, Deserialize, EnumString, AsRefStr, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SearchType {
    Album,
    Artist,
    Playlist,
    Track,
    Show,
    Episode,
    Audiobook,
}

/// A search query for finding content in the Spotify catalog.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchQuery<'a> {
    /// The search query string
    pub query: &'a str,
    /// Types of content to search for, tracks when unset
    pub search_types: Option<Vec<SearchType>>,
    /// Maximum number of results per type
    pub limit: Option<u32>,
    /// Index of the first result to return
    pub offset: Option<u32>,
    /// ISO 3166-1 alpha-2 country code to restrict results to
    #[serde(borrow)]
    pub market: Option<&'a str>,
}

impl<'a> SearchQuery<'a> {
    /// Create a new search query with the specified search string.
    ///
    /// ```no_run
    /// use spotrs::SearchQuery;
    ///
    /// let search = SearchQuery::new("Daft Punk");
    /// ```
    pub fn new(query: &'a str) -> Self {
        Self {
            query,
            search_types: None,
            limit: None,
            offset: None,
            market: None,
        }
    }

    fn type_param(&self) -> String {
        match &self.search_types {
            Some(types) if !types.is_empty() => types
                .iter()
                .map(|search_type| search_type.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            _ => SearchType::Track.as_ref().to_string(),
        }
    }
}

impl SpotifyClient {
    /// Search the Spotify catalog.
    ///
    /// Only the requested page is fetched.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example(client: spotrs::SpotifyClient) -> Result<(), spotrs::Error> {
    /// let mut search = spotrs::SearchQuery::new("Daft Punk");
    /// search.search_types = Some(vec![spotrs::SearchType::Artist, spotrs::SearchType::Track]);
    ///
    /// if let Some(results) = client.search(search).await?.into_content() {
    ///     for track in results.tracks.unwrap_or_default().items {
    ///         println!("{} - {}", track.artist_names(), track.name);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search<'a>(&self, search: SearchQuery<'a>) -> Result<Response<SearchResults>, Error> {
        let types = search.type_param();
        let limit = search.limit.map(|limit| limit.to_string());
        let offset = search.offset.map(|offset| offset.to_string());

        let mut params = vec![("q", search.query), ("type", types.as_str())];

        // Optional fields:
        if let Some(limit) = limit.as_deref() {
            params.push(("limit", limit));
        }
        if let Some(offset) = offset.as_deref() {
            params.push(("offset", offset));
        }
        if let Some(market) = search.market {
            params.push(("market", market));
        }

        let url = with_query(&format!("{SPOTIFY_API_BASE_URL}/search"), &params);
        self.do_request(Method::GET, &url, None, true).await
    }
}

/// Results from a search, one page per requested type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    /// Matching tracks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Page<Track>>,

    /// Matching artists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artists: Option<Page<Artist>>,

    /// Matching albums
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albums: Option<Page<Album>>,

    /// Matching playlists; Spotify may return null entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlists: Option<Page<Option<PlaylistSummary>>>,

    /// Matching shows (currently as raw JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shows: Option<Page<Value>>,

    /// Matching episodes (currently as raw JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<Page<Value>>,

    /// Matching audiobooks (currently as raw JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiobooks: Option<Page<Value>>,
}
