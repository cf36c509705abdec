//! Fetches a JSON document twice (the second time from cache) and prints it.
//!
//! ```text
//! RUST_LOG=cachefetch=debug cargo run --example fetch_item -- https://rickandmortyapi.com/api/character/1
//! ```

use cachefetch::config::FetchConfig;
use cachefetch::fetch::FetchService;
use cachefetch::fetcher::ModelFetcher;
use cachefetch::main_queue;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://rickandmortyapi.com/api/character/1".to_owned());

    let fetcher = ModelFetcher::new(FetchService::from_config(&FetchConfig::default())?);

    let first: Option<serde_json::Value> = fetcher.fetch_model_object(&url).await?;
    println!("network: {}", first.map(|v| v.to_string()).unwrap_or_default());

    // Same request again, delivered through the main queue; served from cache.
    let (queue, mut main_loop) = main_queue();
    fetcher.fetch_model_object_on::<serde_json::Value, _>(&url, &queue, |result| match result {
        Ok(Some(value)) => println!("cached:  {value}"),
        Ok(None) => println!("cached:  <no decodable payload>"),
        Err(e) => eprintln!("error: {e}"),
    });
    main_loop.run_next().await;

    Ok(())
}
