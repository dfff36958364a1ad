//! `wmoov-weekend`: this weekend's movies and showtimes from WMOOV

mod args;
mod report;

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use wmoov_core::{Browser, Movie, Result, ScrapeError, WeekendScraper, WeekendWindow};

use args::{Args, Engine};
use report::{render_error, WeekendReport};

/// Conventional exit status after SIGINT
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ScrapeError::Interrupted) => {
            warn!("Scraper interrupted by user");
            eprintln!("Interrupted by user.");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("Failed to scrape movies: {}", e);
            eprintln!("{}", render_error(&format!("Failed to scrape movies: {}", e)));
            ExitCode::FAILURE
        }
    }
}

/// Info for this program and the library, `debug` with `--verbose`;
/// `RUST_LOG` takes precedence
fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("wmoov_core", level)
        .filter_module("wmoov_weekend", level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

async fn run(args: &Args) -> Result<()> {
    let config = args.scraper_config();
    let offset = config.utc_offset()?;
    let window = args.weekend(&config)?;
    info!(
        "Target weekend: {} - {}",
        window.saturday.format("%Y-%m-%d (%A)"),
        window.sunday.format("%Y-%m-%d (%A)")
    );

    let mut movies = match args.engine {
        Engine::Chrome => {
            let scraper = WeekendScraper::launch(config, args.chrome_config()).await?;
            scrape(scraper, window).await?
        }
        Engine::Http => scrape(WeekendScraper::over_http(config)?, window).await?,
    };
    args.sort.apply(&mut movies);

    let report = WeekendReport::new(&movies, window, Utc::now().with_timezone(&offset));
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

/// Run the scrape until it finishes or Ctrl-C arrives, then close the
/// browser exactly once
async fn scrape<B: Browser>(scraper: WeekendScraper<B>, window: WeekendWindow) -> Result<Vec<Movie>> {
    let result = tokio::select! {
        movies = scraper.scrape_weekend(window) => movies,
        _ = interrupted() => Err(ScrapeError::Interrupted),
    };

    if let Err(e) = scraper.close().await {
        warn!("Failed to close browser: {}", e);
    }
    result
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
