//! Searches for a track, queues it and skips to it.
//!
//! Usage: `cargo run --example search_and_queue -- daft punk one more time`

use spotrs::{Config, SearchQuery, SearchType, SkipDirection, SpotifyClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("Usage: search_and_queue <query>");
        return Ok(());
    }

    let client = SpotifyClient::connect(Config::from_env()?).await?;

    // Show a few candidates first
    let mut search = SearchQuery::new(&query);
    search.search_types = Some(vec![SearchType::Track]);
    search.limit = Some(5);
    if let Some(results) = client.search(search).await?.into_content() {
        for track in results.tracks.map(|page| page.items).unwrap_or_default() {
            println!("  {} - {}", track.name, track.artist_names());
        }
    }

    let uri = client.search_and_queue(&query).await?;
    println!("Queued {}", uri);

    client.skip(SkipDirection::Next).await?;
    println!("Skipped to the queued track");

    Ok(())
}
