use crate::Error;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: &[&str] = &[
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "playlist-read-private",
];

pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Application registration details and local settings.
///
/// # Example
///
/// ```no_run
/// use spotrs::Config;
///
/// let config = Config::new("client_id", "client_secret", "http://localhost:8888/callback")
///     .with_scopes(["user-read-playback-state"])
///     .with_credentials_path("/var/lib/player/credentials.json");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Client ID from the Spotify developer dashboard
    pub client_id: String,
    /// `base64(client_id:client_secret)`, sent as the Basic credential
    pub basic_auth: String,
    /// Redirect URI registered for the application
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
    /// Where the credential document is kept
    pub credentials_path: PathBuf,
}

impl Config {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl AsRef<str>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        let client_id = client_id.into();
        let basic_auth = STANDARD.encode(format!("{}:{}", client_id, client_secret.as_ref()));
        Self::with_basic_auth(client_id, basic_auth, redirect_uri)
    }

    /// Build from an already encoded `base64(client_id:client_secret)` string.
    pub fn with_basic_auth(
        client_id: impl Into<String>,
        basic_auth: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            basic_auth: basic_auth.into(),
            redirect_uri: redirect_uri.into(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// | Variable | |
    /// |---|---|
    /// | `SPOTIFY_CLIENT_ID` | required |
    /// | `SPOTIFY_CLIENT_SECRET` | required unless `SPOTIFY_BASIC_AUTH` is set |
    /// | `SPOTIFY_BASIC_AUTH` | pre-encoded `base64(id:secret)` |
    /// | `SPOTIFY_REDIRECT_URI` | required |
    /// | `SPOTIFY_SCOPES` | space separated, optional |
    /// | `SPOTIFY_CREDENTIALS_PATH` | optional, defaults to `credentials.json` |
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|value| !value.trim().is_empty());

        let client_id = var("SPOTIFY_CLIENT_ID").ok_or(Error::MissingConfig("SPOTIFY_CLIENT_ID"))?;
        let redirect_uri =
            var("SPOTIFY_REDIRECT_URI").ok_or(Error::MissingConfig("SPOTIFY_REDIRECT_URI"))?;

        let mut config = match var("SPOTIFY_BASIC_AUTH") {
            Some(basic_auth) => Self::with_basic_auth(client_id, basic_auth, redirect_uri),
            None => {
                let secret = var("SPOTIFY_CLIENT_SECRET")
                    .ok_or(Error::MissingConfig("SPOTIFY_CLIENT_SECRET"))?;
                Self::new(client_id, secret, redirect_uri)
            }
        };

        if let Some(scopes) = var("SPOTIFY_SCOPES") {
            config = config.with_scopes(scopes.split_whitespace());
        }
        if let Some(path) = var("SPOTIFY_CREDENTIALS_PATH") {
            config = config.with_credentials_path(path);
        }

        Ok(config)
    }

    /// Scopes joined the way the authorize endpoint expects them.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}
