//! Live run against wmoov.com over plain HTTP.
//!
//! cargo run -p wmoov-core --example live_weekend -- [limit]

use wmoov_core::{ScraperConfig, WeekendScraper};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let limit = std::env::args().nth(1).and_then(|arg| arg.parse().ok()).or(Some(5));
    let config = ScraperConfig {
        limit,
        ..ScraperConfig::default()
    };

    let scraper = WeekendScraper::over_http(config)?;
    let window = scraper.upcoming_weekend()?;
    println!("Weekend {} - {}\n", window.saturday, window.sunday);

    let movies = scraper.scrape_weekend(window).await?;
    println!("{} movies with weekend showtimes:", movies.len());
    for movie in &movies {
        println!("  {} ({} showtimes)", movie.title, movie.showtimes.len());
        for showtime in movie.showtimes.iter().take(3) {
            println!(
                "    {} {} {} ${}",
                showtime.date, showtime.time, showtime.cinema, showtime.price
            );
        }
    }

    scraper.close().await?;
    Ok(())
}
