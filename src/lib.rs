#![doc = include_str!("../README.md")]

mod album;
mod artist;
mod auth;
mod clock;
mod config;
mod player;
mod playlist;
mod search;
mod store;
mod track;
mod transport;

pub use album::*;
pub use artist::*;
pub use auth::*;
pub use clock::*;
pub use config::*;
pub use player::*;
pub use playlist::*;
pub use search::*;
pub use store::*;
pub use track::*;
pub use transport::*;

use arc_swap::ArcSwap;
use async_recursion::async_recursion;
use reqwest::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub(crate) static SPOTIFY_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
pub(crate) static SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Error object returned by the Spotify Web API for failed resource requests.
///
/// Spotify wraps it in an `{"error": {...}}` envelope; see [`SpotifyApiError::from_body`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SpotifyApiError {
    /// HTTP status code
    pub status: u16,
    /// Human-readable error message
    #[serde(default)]
    pub message: String,
}

impl SpotifyApiError {
    /// Parse the error object out of a response body, if the body carries one.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        #[derive(Deserialize)]
        struct Envelope {
            error: SpotifyApiError,
        }

        serde_json::from_slice::<Envelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

impl Display for SpotifyApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Spotify API error: {} {}", self.status, self.message)
    }
}

/// Errors that can occur when using the spotrs library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (network issues, TLS, etc.)
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    /// JSON serialization/deserialization failed
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    /// Reading or writing the credential store failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The access token was still rejected after one refresh and retry
    #[error("Request still unauthorized after refreshing the access token")]
    Unauthorized,
    /// A resource endpoint answered with a status other than 200, 204 or 401
    #[error(
        "Unexpected response status {status}{}",
        .error.as_ref().map(|e| format!(" ({e})")).unwrap_or_default()
    )]
    UnexpectedStatus {
        status: u16,
        error: Option<SpotifyApiError>,
    },
    /// A 200 response whose body could not be parsed into the expected shape
    #[error("Malformed response from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// The token endpoint answered without the fields the grant requires
    #[error("Token exchange ({grant_type}) failed with status {status}: {response}")]
    TokenExchange {
        grant_type: String,
        status: u16,
        response: String,
    },
    /// No refresh token is available to refresh the session
    #[error("No refresh token available - has the client been authorized?")]
    NoRefreshToken,
    /// The authorization code provider returned nothing usable
    #[error("No authorization code was provided")]
    NoAuthorizationCode,
    /// The credential store does not hold a JSON object
    #[error("Credential store is not a JSON object: {0}")]
    InvalidCredentialStore(String),
    /// A search produced no items to act on
    #[error("No search results for \"{0}\"")]
    NoSearchResults(String),
    /// A required configuration value is missing
    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),
    /// The clock could not produce the current time
    #[error("Clock error: {0}")]
    Clock(String),
}

/// Outcome of a successful call against a resource endpoint.
///
/// Spotify answers `204 No Content` when there is nothing to report (for
/// example when nothing is currently playing), which is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T> {
    /// `200 OK` with a parsed body
    Content(T),
    /// `204 No Content`
    NoContent,
}

impl<T> Response<T> {
    /// The HTTP status this outcome corresponds to.
    pub fn status(&self) -> u16 {
        match self {
            Response::Content(_) => 200,
            Response::NoContent => 204,
        }
    }

    pub fn is_no_content(&self) -> bool {
        matches!(self, Response::NoContent)
    }

    pub fn content(&self) -> Option<&T> {
        match self {
            Response::Content(content) => Some(content),
            Response::NoContent => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Response::Content(content) => Some(content),
            Response::NoContent => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Response<U> {
        match self {
            Response::Content(content) => Response::Content(f(content)),
            Response::NoContent => Response::NoContent,
        }
    }
}

/// Callback function type for handling session refresh events.
///
/// Invoked after every successful refresh-token exchange with the new session.
pub type SessionCallback = Arc<dyn Fn(Session) + Send + Sync>;

/// Main client for interacting with the Spotify Web API.
///
/// The client owns the [`Session`] (access token, refresh token, expiry) and
/// refreshes it transparently when a request is rejected with `401`.
///
/// # Example
///
/// ```no_run
/// use spotrs::{Config, SpotifyClient};
///
/// # async fn example() -> Result<(), spotrs::Error> {
/// let config = Config::new("client_id", "client_secret", "http://localhost:8888/callback");
/// let client = SpotifyClient::connect(config).await?;
///
/// if let Some(snapshot) = client.formatted_playback().await?.into_content() {
///     println!("Now playing: {:?}", snapshot.name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SpotifyClient {
    config: Config,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    store: Arc<dyn CredentialStore>,
    session: ArcSwap<Session>,
    refresh_semaphore: Semaphore,
    authorization_code_provider: AuthorizationCodeProvider,
    on_session_refresh_callback: Option<SessionCallback>,
}

impl SpotifyClient {
    /// Create a new, not yet authorized client.
    ///
    /// Credentials are persisted to `config.credentials_path` and the
    /// authorization code is read from stdin unless overridden with the
    /// `with_*` builders. Call [`SpotifyClient::bootstrap`] before issuing
    /// requests, or use [`SpotifyClient::connect`].
    pub fn new(config: Config) -> Self {
        let store = JsonFileStore::new(config.credentials_path.clone());
        Self {
            config,
            transport: Arc::new(ReqwestTransport::new()),
            clock: Arc::new(SystemClock),
            store: Arc::new(store),
            session: ArcSwap::from_pointee(Session::default()),
            refresh_semaphore: Semaphore::new(1),
            authorization_code_provider: Arc::new(prompt_for_code),
            on_session_refresh_callback: None,
        }
    }

    /// Create a client with the default collaborators and bootstrap it.
    pub async fn connect(config: Config) -> Result<Self, Error> {
        let client = Self::new(config);
        client.bootstrap().await?;
        Ok(client)
    }

    /// Send requests through a custom reqwest client.
    ///
    /// Useful to configure timeouts or proxies.
    ///
    /// ```no_run
    /// use spotrs::{Config, SpotifyClient};
    ///
    /// let http = reqwest::Client::builder()
    ///     .timeout(std::time::Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = SpotifyClient::new(Config::new("id", "secret", "http://localhost/cb"))
    ///     .with_client(http);
    /// ```
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.transport = Arc::new(ReqwestTransport::with_client(client));
        self
    }

    /// Replace the HTTP transport entirely.
    pub fn with_transport<T: HttpTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the clock used to timestamp token expiry.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the credential store.
    pub fn with_credential_store<S: CredentialStore + 'static>(mut self, store: S) -> Self {
        self.store = Arc::new(store);
        self
    }

    /// Start from an existing session, e.g. one persisted by the caller.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = ArcSwap::from_pointee(session);
        self
    }

    /// Supply the authorization code non-interactively.
    ///
    /// The provider receives the authorization URL and returns the code the
    /// user obtained from it. Headless deployments can hand over a code that
    /// was captured elsewhere.
    ///
    /// ```no_run
    /// use spotrs::{Config, SpotifyClient};
    ///
    /// let client = SpotifyClient::new(Config::new("id", "secret", "http://localhost/cb"))
    ///     .with_authorization_code_provider(|_url| Ok("AQD...".to_string()));
    /// ```
    pub fn with_authorization_code_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str) -> Result<String, Error> + Send + Sync + 'static,
    {
        self.authorization_code_provider = Arc::new(provider);
        self
    }

    /// Set a callback invoked with the new session after every refresh.
    pub fn with_session_refresh_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Session) + Send + Sync + 'static,
    {
        self.on_session_refresh_callback = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Arc<Session> {
        self.session.load_full()
    }

    /// Whether an access token has been established.
    pub fn is_authorized(&self) -> bool {
        self.session.load().is_authorized()
    }

    /// Issue an authenticated GET against an absolute URL.
    pub async fn get(&self, url: &str) -> Result<Response<serde_json::Value>, Error> {
        self.do_request(Method::GET, url, None, true).await
    }

    /// Issue an authenticated POST against an absolute URL, with an optional JSON body.
    pub async fn post(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response<serde_json::Value>, Error> {
        self.do_request(Method::POST, url, body, true).await
    }

    // Send the request with the current bearer token. A 401 triggers one
    // refresh and one resend of the same request.
    #[async_recursion]
    pub(crate) async fn do_request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        retry_unauthorized: bool,
    ) -> Result<Response<T>, Error> {
        let mut req = HttpRequest::new(method.clone(), url);

        let access_token = self.session.load().access_token.clone();
        if !access_token.is_empty() {
            req = req.bearer_token(&access_token);
        }

        if let Some(body) = body.as_ref() {
            req = req.json(body)?;
        }

        let resp = self.transport.send(req).await?;

        match resp.status {
            200 => {
                // If it's an empty body, just encode a null value
                let value = if resp.body.is_empty() {
                    serde_json::Value::Null
                } else {
                    serde_json::from_slice(&resp.body).map_err(|source| {
                        Error::MalformedResponse {
                            url: url.to_string(),
                            source,
                        }
                    })?
                };

                if log::log_enabled!(log::Level::Trace) {
                    let pretty_value = serde_json::to_string_pretty(&value).unwrap_or_default();
                    log::trace!("Requested URL: {}", url);
                    log::trace!("Response {}", pretty_value);
                }

                match serde_json::from_value(value) {
                    Ok(parsed) => Ok(Response::Content(parsed)),
                    Err(source) => {
                        log::debug!("Requested URL: {}", url);
                        log::debug!("JSON deserialization error: {}", source);
                        Err(Error::MalformedResponse {
                            url: url.to_string(),
                            source,
                        })
                    }
                }
            }
            204 => Ok(Response::NoContent),
            401 if retry_unauthorized => {
                log::debug!("Access token rejected for {}, refreshing", url);
                self.refresh_stale_session(&access_token).await?;
                self.do_request(method, url, body, false).await
            }
            401 => {
                log::debug!("Access token still rejected for {} after refresh", url);
                Err(Error::Unauthorized)
            }
            status => {
                let error = SpotifyApiError::from_body(&resp.body);
                if log::log_enabled!(log::Level::Debug) {
                    log::debug!("Requested URL: {}", url);
                    log::debug!(
                        "Unexpected status {}: {}",
                        status,
                        String::from_utf8_lossy(&resp.body)
                    );
                }
                Err(Error::UnexpectedStatus { status, error })
            }
        }
    }
}

/// Join a base URL and query parameters, form-encoding the values.
pub(crate) fn with_query(base: &str, params: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// A paging object as returned by Spotify list endpoints.
///
/// Only the page that was requested is ever fetched; `next` is exposed for
/// callers that want to follow it themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Page<T> {
    /// Items in the current page
    #[serde(
        deserialize_with = "deserialize_null_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub items: Vec<T>,
    /// Offset of the current page
    pub offset: usize,
    /// Maximum number of items per page
    pub limit: usize,
    /// Total number of items available
    pub total: usize,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // The number of items left to fetch
    pub fn num_left(&self) -> usize {
        self.total
            .saturating_sub(self.offset)
            .saturating_sub(self.items.len())
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            offset: 0,
            limit: 0,
            total: 0,
            next: None,
            previous: None,
        }
    }
}

/// Cover art or profile image. Spotify lists these widest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// Known external URLs for an object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalUrls {
    /// The open.spotify.com URL
    pub spotify: Option<String>,
}

// Utility function to deserialize a null value as a default value
pub(crate) fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}
