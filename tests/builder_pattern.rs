//! Tests for configuring `Config` and `SpotifyClient` through their builders.

mod common;

use common::*;
use spotrs::{Config, DEFAULT_CREDENTIALS_PATH, DEFAULT_SCOPES, Error, Session, SpotifyClient};
use std::collections::HashMap;
use std::path::PathBuf;

#[test]
fn test_config_defaults() {
    let config = Config::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI);

    assert_eq!(config.client_id, CLIENT_ID);
    assert_eq!(config.basic_auth, BASIC_AUTH);
    assert_eq!(config.redirect_uri, REDIRECT_URI);
    assert_eq!(config.scopes, DEFAULT_SCOPES);
    assert_eq!(config.credentials_path, PathBuf::from(DEFAULT_CREDENTIALS_PATH));
}

#[test]
fn test_config_with_pre_encoded_basic_auth() {
    let config = Config::with_basic_auth(CLIENT_ID, BASIC_AUTH, REDIRECT_URI);

    assert_eq!(config, Config::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI));
}

#[test]
fn test_config_chaining() {
    let config = Config::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI)
        .with_scopes(["user-read-playback-state", "user-modify-playback-state"])
        .with_credentials_path("/var/lib/player/credentials.json");

    assert_eq!(
        config.scope_string(),
        "user-read-playback-state user-modify-playback-state"
    );
    assert_eq!(
        config.credentials_path,
        PathBuf::from("/var/lib/player/credentials.json")
    );
}

#[test]
fn test_config_from_lookup() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_CLIENT_ID", CLIENT_ID),
        ("SPOTIFY_CLIENT_SECRET", CLIENT_SECRET),
        ("SPOTIFY_REDIRECT_URI", REDIRECT_URI),
        ("SPOTIFY_SCOPES", "user-read-playback-state  playlist-read-private"),
        ("SPOTIFY_CREDENTIALS_PATH", "creds/spotify.json"),
    ]);

    let config = Config::from_lookup(|name| vars.get(name).map(|value| value.to_string())).unwrap();

    assert_eq!(config.basic_auth, BASIC_AUTH);
    assert_eq!(
        config.scopes,
        vec!["user-read-playback-state", "playlist-read-private"]
    );
    assert_eq!(config.credentials_path, PathBuf::from("creds/spotify.json"));
}

#[test]
fn test_config_from_lookup_prefers_basic_auth() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_CLIENT_ID", CLIENT_ID),
        ("SPOTIFY_BASIC_AUTH", "cHJlOmVuY29kZWQ="),
        ("SPOTIFY_REDIRECT_URI", REDIRECT_URI),
    ]);

    let config = Config::from_lookup(|name| vars.get(name).map(|value| value.to_string())).unwrap();

    assert_eq!(config.basic_auth, "cHJlOmVuY29kZWQ=");
    assert_eq!(config.scopes, DEFAULT_SCOPES);
}

#[test]
fn test_config_from_lookup_missing_values() {
    let err = Config::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, Error::MissingConfig("SPOTIFY_CLIENT_ID")));

    let vars: HashMap<&str, &str> = HashMap::from([
        ("SPOTIFY_CLIENT_ID", CLIENT_ID),
        ("SPOTIFY_REDIRECT_URI", REDIRECT_URI),
        ("SPOTIFY_CLIENT_SECRET", "   "),
    ]);
    let err = Config::from_lookup(|name| vars.get(name).map(|value| value.to_string())).unwrap_err();
    assert!(matches!(err, Error::MissingConfig("SPOTIFY_CLIENT_SECRET")));
}

#[test]
fn test_client_defaults() {
    let client = SpotifyClient::new(config());

    assert!(!client.is_authorized());
    assert_eq!(*client.session(), Session::default());
    assert_eq!(client.config().client_id, CLIENT_ID);
}

#[test]
fn test_client_with_session() {
    let client = SpotifyClient::new(config()).with_session(Session::new(
        "test_access_token".to_string(),
        "test_refresh_token".to_string(),
        None,
    ));

    assert!(client.is_authorized());
    let session = client.session();
    assert_eq!(session.access_token, "test_access_token");
    assert_eq!(session.refresh_token, "test_refresh_token");
    assert_eq!(session.expires_at(), None);
}

#[test]
fn test_client_with_custom_reqwest_client() {
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap();

    let client = SpotifyClient::new(config()).with_client(http);

    assert!(!client.is_authorized());
}

#[test]
fn test_builder_chaining() {
    let transport = ScriptedTransport::new();

    let client = SpotifyClient::new(config())
        .with_transport(transport.clone())
        .with_clock(FixedClock::default())
        .with_credential_store(spotrs::MemoryStore::new())
        .with_session(Session::new("T0".to_string(), "R0".to_string(), None))
        .with_authorization_code_provider(|_url| Ok("code".to_string()))
        .with_session_refresh_callback(|_session| {});

    assert!(client.is_authorized());
    assert!(client.authorization_url().starts_with(
        "https://accounts.spotify.com/authorize?client_id=client-id&scope="
    ));
    assert!(transport.requests().is_empty());
}
