use crate::Error;
use crate::SPOTIFY_ACCOUNTS_BASE_URL;
use crate::SpotifyClient;
use crate::store::{set_refresh_token, stored_refresh_token};
use crate::transport::HttpRequest;
use crate::with_query;
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Callback that turns the authorization URL into an authorization code.
pub type AuthorizationCodeProvider = Arc<dyn Fn(&str) -> Result<String, Error> + Send + Sync>;

/// When the current access token was obtained and for how long it is valid.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expiry {
    pub obtained_at: DateTime<Utc>,
    /// Lifetime of the access token in seconds
    pub expires_in: u64,
}

impl Expiry {
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| self.obtained_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Tokens held by a client for the lifetime of the process.
///
/// Only the refresh token is persisted (through the credential store); the
/// access token is re-obtained on every start.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential for API requests, empty until the first exchange
    pub access_token: String,
    /// Long-lived credential exchanged for new access tokens
    pub refresh_token: String,
    pub expiry: Option<Expiry>,
}

impl Session {
    pub fn new(access_token: String, refresh_token: String, expiry: Option<Expiry>) -> Self {
        Self {
            access_token,
            refresh_token,
            expiry,
        }
    }

    pub fn is_authorized(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.as_ref().map(Expiry::expires_at)
    }
}

// Body of a token endpoint reply. Every field is optional so that error-shaped
// replies still parse and can be reported.
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

struct TokenReply {
    grant_type: &'static str,
    status: u16,
    raw: String,
    token: TokenResponse,
}

impl TokenReply {
    fn failure(self) -> Error {
        log::warn!(
            "Token exchange ({}) failed with status {}: {} {}",
            self.grant_type,
            self.status,
            self.token.error.as_deref().unwrap_or("missing token fields"),
            self.token.error_description.as_deref().unwrap_or_default(),
        );
        log::debug!("Token endpoint response: {}", self.raw);
        Error::TokenExchange {
            grant_type: self.grant_type.to_string(),
            status: self.status,
            response: self.raw,
        }
    }
}

impl SpotifyClient {
    /// URL the user visits to grant access.
    ///
    /// After consenting, Spotify redirects to the configured redirect URI with
    /// the authorization code in the `code` query parameter.
    pub fn authorization_url(&self) -> String {
        let scope = self.config.scope_string();
        with_query(
            &format!("{SPOTIFY_ACCOUNTS_BASE_URL}/authorize"),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("scope", scope.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )
    }

    /// Load the stored refresh token and establish an access token.
    ///
    /// With no stored refresh token the authorization code provider is asked
    /// for a code (by default the URL is printed and the code read from
    /// stdin), which is exchanged and the resulting refresh token persisted.
    /// Otherwise a single refresh is performed.
    pub async fn bootstrap(&self) -> Result<(), Error> {
        let document = self.store.load()?;

        match stored_refresh_token(&document) {
            Some(refresh_token) => {
                log::info!("Found stored refresh token, refreshing access token");
                let current = self.session();
                self.session.store(Arc::new(Session {
                    refresh_token: refresh_token.to_string(),
                    ..(*current).clone()
                }));
                self.refresh_access_token().await
            }
            None => {
                log::info!("No stored refresh token, requesting authorization code");
                let url = self.authorization_url();
                let code = (self.authorization_code_provider)(&url)?;
                let code = code.trim();
                if code.is_empty() {
                    return Err(Error::NoAuthorizationCode);
                }
                self.exchange_authorization_code(code).await
            }
        }
    }

    /// Exchange an authorization code for the first token pair.
    ///
    /// On success the session holds the new tokens and the refresh token is
    /// persisted. A reply without `access_token`, `refresh_token` and
    /// `expires_in` is logged and returned as [`Error::TokenExchange`]; the
    /// session is left untouched.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<(), Error> {
        let reply = self
            .request_token(
                "authorization_code",
                &[
                    ("code", code),
                    ("redirect_uri", self.config.redirect_uri.as_str()),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;

        let (access_token, refresh_token, expires_in) = match (
            reply.token.access_token.clone(),
            reply.token.refresh_token.clone(),
            reply.token.expires_in,
        ) {
            (Some(access_token), Some(refresh_token), Some(expires_in)) => {
                (access_token, refresh_token, expires_in)
            }
            _ => return Err(reply.failure()),
        };

        let obtained_at = self.timestamp().await;
        self.session.store(Arc::new(Session {
            access_token,
            refresh_token: refresh_token.clone(),
            expiry: Some(Expiry {
                obtained_at,
                expires_in,
            }),
        }));
        log::info!("Authorization code exchanged, client authorized");

        self.persist_refresh_token(&refresh_token)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// A refresh token in the reply replaces the stored one and is persisted;
    /// without one the current refresh token is kept. A reply without
    /// `access_token` and `expires_in` is logged and returned as
    /// [`Error::TokenExchange`], leaving the session untouched.
    pub async fn refresh_access_token(&self) -> Result<(), Error> {
        let stale_token = self.session.load().access_token.clone();
        self.refresh_stale_session(&stale_token).await
    }

    // Refresh unless the access token has already moved on from `stale_token`.
    // Callers that queue behind a failed refresh run their own exchange and
    // see its error.
    pub(crate) async fn refresh_stale_session(&self, stale_token: &str) -> Result<(), Error> {
        // Try to become the single refresher
        let permit = match self.refresh_semaphore.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                // Someone else is refreshing, wait for them to finish. The
                // semaphore is never closed.
                self.refresh_semaphore
                    .acquire()
                    .await
                    .map_err(|_| Error::Unauthorized)?
            }
        };

        let current = self.session();
        if current.access_token != stale_token {
            log::debug!("Access token already refreshed");
            return Ok(());
        }

        if current.refresh_token.is_empty() {
            return Err(Error::NoRefreshToken);
        }

        let reply = self
            .request_token(
                "refresh_token",
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", current.refresh_token.as_str()),
                ],
            )
            .await?;

        let (access_token, expires_in) =
            match (reply.token.access_token.clone(), reply.token.expires_in) {
                (Some(access_token), Some(expires_in)) => (access_token, expires_in),
                _ => return Err(reply.failure()),
            };

        // Spotify does not always rotate the refresh token
        let rotated = reply
            .token
            .refresh_token
            .filter(|token| !token.is_empty() && *token != current.refresh_token);

        let obtained_at = self.timestamp().await;
        let new_session = Session {
            access_token,
            refresh_token: rotated
                .clone()
                .unwrap_or_else(|| current.refresh_token.clone()),
            expiry: Some(Expiry {
                obtained_at,
                expires_in,
            }),
        };

        // Single, quick swap visible to all readers
        self.session.store(Arc::new(new_session.clone()));

        drop(permit);
        log::debug!("Access token refreshed");

        if let Some(refresh_token) = rotated {
            if let Err(e) = self.persist_refresh_token(&refresh_token) {
                log::error!("Failed to persist rotated refresh token: {}", e);
            }
        }

        if let Some(cb) = &self.on_session_refresh_callback {
            cb(new_session);
        }

        Ok(())
    }

    async fn request_token(
        &self,
        grant_type: &'static str,
        form: &[(&str, &str)],
    ) -> Result<TokenReply, Error> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();

        let req = HttpRequest::new(Method::POST, format!("{SPOTIFY_ACCOUNTS_BASE_URL}/api/token"))
            .header(
                AUTHORIZATION.as_str(),
                format!("Basic {}", self.config.basic_auth),
            )
            .header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .body(body.into_bytes());

        let resp = self.transport.send(req).await?;

        Ok(TokenReply {
            grant_type,
            status: resp.status,
            raw: redact_tokens(&resp.body),
            token: serde_json::from_slice(&resp.body).unwrap_or_default(),
        })
    }

    fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), Error> {
        let mut document = self.store.load()?;
        set_refresh_token(&mut document, refresh_token);
        self.store.save(&document)
    }

    async fn timestamp(&self) -> DateTime<Utc> {
        match self.clock.now().await {
            Ok(now) => now,
            Err(e) => {
                log::warn!("Clock unavailable ({}), using system time", e);
                Utc::now()
            }
        }
    }
}

// Token endpoint body with the token values blanked, fit for logs and errors.
fn redact_tokens(body: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(mut fields)) => {
            for key in ["access_token", "refresh_token"] {
                if let Some(value) = fields.get_mut(key) {
                    *value = serde_json::Value::String("<redacted>".to_string());
                }
            }
            serde_json::Value::Object(fields).to_string()
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

/// Default authorization code provider: print the URL, read the code from stdin.
///
/// Either the bare code or the whole URL the browser was redirected to may be
/// pasted; in the latter case the `code` query parameter is extracted.
pub fn prompt_for_code(authorization_url: &str) -> Result<String, Error> {
    println!("{authorization_url}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let code = extract_authorization_code(&input);
    if code.is_empty() {
        return Err(Error::NoAuthorizationCode);
    }
    Ok(code)
}

/// Pull the `code` parameter out of a redirect URL, or return the trimmed
/// input unchanged when it is not a URL.
pub fn extract_authorization_code(input: &str) -> String {
    let input = input.trim();
    match url::Url::parse(input) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default(),
        Err(_) => input.to_string(),
    }
}
