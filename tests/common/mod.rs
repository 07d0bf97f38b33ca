//! Test doubles shared by the integration tests: a transport that replays
//! scripted responses and records every request, and a fixed clock.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use spotrs::{
    Clock, Config, Error, HttpRequest, HttpResponse, HttpTransport, MemoryStore, SpotifyClient,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "secret";
pub const BASIC_AUTH: &str = "Y2xpZW50LWlkOnNlY3JldA==";
pub const REDIRECT_URI: &str = "http://localhost:8888/callback";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const PLAYER_URL: &str = "https://api.spotify.com/v1/me/player";

#[derive(Default)]
struct Script {
    responses: VecDeque<HttpResponse>,
    requests: Vec<HttpRequest>,
}

/// Replays queued responses in order and records the requests it was given.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .responses
            .push_back(HttpResponse::new(status, body.as_bytes().to_vec()));
        self
    }

    pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
        self.respond(status, &body.to_string())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|req| req.url).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let mut script = self.script.lock().unwrap();
        let description = format!("{} {}", request.method, request.url);
        script.requests.push(request);
        match script.responses.pop_front() {
            Some(response) => Ok(response),
            None => panic!("no scripted response left for {description}"),
        }
    }
}

/// Answers the player endpoint and the token endpoint by URL so that several
/// requests can be in flight at once. The player accepts only
/// `accepted_token`; token replies are delayed so that refreshes overlap.
#[derive(Clone)]
pub struct DelayedTokenTransport {
    token_reply: HttpResponse,
    accepted_token: String,
    token_calls: Arc<AtomicUsize>,
}

impl DelayedTokenTransport {
    pub fn new(token_status: u16, token_body: serde_json::Value, accepted_token: &str) -> Self {
        Self {
            token_reply: HttpResponse::new(token_status, token_body.to_string()),
            accepted_token: accepted_token.to_string(),
            token_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn token_calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for DelayedTokenTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        if request.url == TOKEN_URL {
            self.token_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            return Ok(self.token_reply.clone());
        }

        let bearer = format!("Bearer {}", self.accepted_token);
        if request.header_value("authorization") == Some(bearer.as_str()) {
            Ok(HttpResponse::new(204, Vec::new()))
        } else {
            Ok(HttpResponse::new(401, Vec::new()))
        }
    }
}

/// Clock that always reports the same instant.
#[derive(Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixed_now())
    }
}

#[async_trait]
impl Clock for FixedClock {
    async fn now(&self) -> Result<DateTime<Utc>, Error> {
        Ok(self.0)
    }
}

/// Clock that always fails, like a device whose time lookup is offline.
pub struct BrokenClock;

#[async_trait]
impl Clock for BrokenClock {
    async fn now(&self) -> Result<DateTime<Utc>, Error> {
        Err(Error::Clock("offline".to_string()))
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn config() -> Config {
    Config::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI)
}

/// A client wired to the given transport and store, whose authorization
/// code provider fails the test if it is ever consulted.
pub fn client(transport: &ScriptedTransport, store: &Arc<MemoryStore>) -> SpotifyClient {
    SpotifyClient::new(config())
        .with_transport(transport.clone())
        .with_clock(FixedClock::default())
        .with_credential_store(store.clone())
        .with_authorization_code_provider(|url| {
            panic!("authorization code requested unexpectedly for {url}")
        })
}

/// A client that already holds access token `T0` and refresh token `R0`.
pub fn authorized_client(transport: &ScriptedTransport) -> (SpotifyClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = client(transport, &store).with_session(spotrs::Session::new(
        "T0".to_string(),
        "R0".to_string(),
        None,
    ));
    (client, store)
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn form(request: &HttpRequest) -> HashMap<String, String> {
    url::form_urlencoded::parse(request.body.as_deref().unwrap_or_default())
        .into_owned()
        .collect()
}

pub fn document(value: serde_json::Value) -> spotrs::CredentialDocument {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}
