//! WMOOV Weekend Scraper Core Library
//!
//! This crate collects the movies showing in Hong Kong cinemas on the coming
//! weekend from wmoov.com, together with their Saturday and Sunday showtimes.
//!
//! # Features
//! - Weekend date calculation in Hong Kong time
//! - Listing extraction scoped to each movie's own entry
//! - Showtime tables read per date through the site's date selector
//! - Two browser engines: headless Chrome, or plain HTTP for static markup

pub mod client;
pub mod config;
pub mod dates;
pub mod driver;
pub mod error;
pub mod listing;
pub mod parser;
pub mod scraper;
pub mod showtimes;
pub mod types;

// Re-export main types for convenience
pub use client::{ClientConfig, PageClient};
pub use config::{ScraperConfig, Selectors, DEFAULT_BASE_URL};
pub use driver::{Browser, ChromeBrowser, ChromeConfig, SnapshotBrowser, StaticPages};
pub use error::{Result, ScrapeError};
pub use scraper::WeekendScraper;
pub use types::{DetailRef, Movie, RowCells, Showtime, WeekendWindow};
