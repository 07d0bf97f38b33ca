//! Prints what is currently playing.
//!
//! Reads its configuration from the environment (see `Config::from_env`).
//! On the first run it prints an authorization URL and waits for the code or
//! the full redirect URL on stdin. Later runs refresh from the stored token.

use spotrs::{Config, SpotifyClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;
    let client = SpotifyClient::connect(config)
        .await?
        .with_session_refresh_callback(|session| {
            println!("Access token refreshed, expires at {:?}", session.expires_at());
        });

    match client.formatted_playback().await?.into_content() {
        Some(snapshot) => {
            let state = if snapshot.playing { "Playing" } else { "Paused" };
            println!(
                "{}: {} by {}",
                state,
                snapshot.name.as_deref().unwrap_or("<unknown>"),
                snapshot.artists.as_deref().unwrap_or("<unknown>")
            );
            if let Some(link) = &snapshot.link {
                println!("  Link: {}", link);
            }
            if let Some(art) = snapshot.hq_art.as_ref().or(snapshot.art.as_ref()) {
                println!("  Cover: {}", art);
            }
        }
        None => println!("Nothing is playing"),
    }

    Ok(())
}
