use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, ValueEnum};
use wmoov_core::dates::{today_in, weekend_for};
use wmoov_core::{ChromeConfig, Movie, Result, ScraperConfig, WeekendWindow, DEFAULT_BASE_URL};

/// Movies showing in Hong Kong cinemas this weekend, with their showtimes
#[derive(Debug, Parser)]
#[command(name = "wmoov-weekend", version)]
pub struct Args {
    /// Show the browser window (useful for debugging)
    #[arg(long = "no-headless", action = ArgAction::SetFalse)]
    pub headless: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// How pages are loaded
    #[arg(long, value_enum, default_value_t = Engine::Chrome)]
    pub engine: Engine,

    /// Site root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Use this date (YYYY-MM-DD) as today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Take at most this many movies from the listing
    #[arg(long)]
    pub limit: Option<usize>,

    /// Order of the movies in the report
    #[arg(long, value_enum, default_value_t = SortOrder::Listing)]
    pub sort: SortOrder,

    /// Print the result as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Save the loaded listing page to PATH
    #[arg(long, value_name = "PATH")]
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Headless Chrome, runs the site's scripts
    Chrome,
    /// Plain HTTP, static markup only
    Http,
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Listing,
    Rating,
    Popularity,
}

impl Args {
    pub fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            base_url: self.base_url.clone(),
            limit: self.limit,
            screenshot: self.screenshot.clone(),
            ..ScraperConfig::default()
        }
    }

    pub fn chrome_config(&self) -> ChromeConfig {
        ChromeConfig {
            headless: self.headless,
            ..ChromeConfig::default()
        }
    }

    /// Weekend following `--date`, or today at the site's offset
    pub fn weekend(&self, config: &ScraperConfig) -> Result<WeekendWindow> {
        let today = match self.date {
            Some(date) => date,
            None => today_in(config.utc_offset()?),
        };
        Ok(weekend_for(today))
    }
}

impl SortOrder {
    /// Sort in place; ties keep listing order
    pub fn apply(self, movies: &mut [Movie]) {
        match self {
            SortOrder::Listing => {}
            SortOrder::Rating => movies.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(Ordering::Equal)
            }),
            SortOrder::Popularity => movies.sort_by(|a, b| b.popularity.cmp(&a.popularity)),
        }
    }
}
