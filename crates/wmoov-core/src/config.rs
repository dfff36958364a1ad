//! Scraper configuration
//!
//! All site-specific knobs (URLs, timezone, delays and CSS selectors) live in
//! [`ScraperConfig`], passed explicitly into the scraper.

use std::path::PathBuf;
use std::time::Duration;

use chrono::FixedOffset;
use reqwest::Url;

use crate::error::{Result, ScrapeError};

/// Base URL of the site
pub const DEFAULT_BASE_URL: &str = "https://wmoov.com";

/// Path of the "now showing" listing page
const DEFAULT_LISTING_PATH: &str = "/movie/showing";

/// Hong Kong time, no daylight saving
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Pause after picking a date so the showtime table can re-render
const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// CSS selectors describing the site's markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    /// Movie headings on the listing page
    pub heading: String,
    /// Link inside a heading
    pub heading_link: String,
    /// Path fragment every detail-page link contains
    pub detail_path: String,
    /// Rating candidates inside a movie's container
    pub rating: String,
    /// Date-selection control on the detail page
    pub date_control: String,
    /// Options of the date-selection control
    pub date_option: String,
    /// Showtime table on the detail page
    pub showtime_table: String,
    /// Rows of the showtime table
    pub table_row: String,
    /// Data cells of a row
    pub table_cell: String,
    /// Booking link inside the last cell
    pub booking_link: String,
}

impl Selectors {
    /// Selector for detail links anywhere inside a movie's container
    pub fn detail_link(&self) -> String {
        format!("a[href*='{}']", self.detail_path)
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            heading: "h3".to_string(),
            heading_link: "a".to_string(),
            detail_path: "/movie/details/".to_string(),
            rating: "div.rating b, .rating".to_string(),
            date_control: "select".to_string(),
            date_option: "option".to_string(),
            showtime_table: "table".to_string(),
            table_row: "tr".to_string(),
            table_cell: "td".to_string(),
            booking_link: "a".to_string(),
        }
    }
}

/// Configuration for a weekend scrape
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site root, e.g. "https://wmoov.com"
    pub base_url: String,
    /// Listing page path relative to `base_url`
    pub listing_path: String,
    /// Offset used to decide what "today" is (default: +8)
    pub utc_offset_hours: i32,
    /// Settle delay after selecting a date, in milliseconds (default: 1000)
    pub settle_delay_ms: u64,
    /// Take at most this many movies from the listing
    pub limit: Option<usize>,
    /// Save the loaded listing page here (debug aid)
    pub screenshot: Option<PathBuf>,
    /// Markup selectors
    pub selectors: Selectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_path: DEFAULT_LISTING_PATH.to_string(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            limit: None,
            screenshot: None,
            selectors: Selectors::default(),
        }
    }
}

impl ScraperConfig {
    /// Absolute URL of the listing page
    pub fn listing_url(&self) -> Result<String> {
        self.resolve(&self.listing_path)
    }

    /// Absolute URL of a detail page from a (usually relative) link target
    ///
    /// # Errors
    /// Returns `ScrapeError::InvalidUrl` if the base URL or href cannot be parsed
    pub fn detail_url(&self, href: &str) -> Result<String> {
        self.resolve(href)
    }

    /// Fixed offset that defines "today"
    ///
    /// # Errors
    /// Returns `ScrapeError::InvalidConfig` for offsets outside ±23 hours
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ScrapeError::InvalidConfig(format!(
                    "UTC offset out of range: {} hours",
                    self.utc_offset_hours
                ))
            })
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    fn resolve(&self, href: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        let url = base
            .join(href)
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", href, e)))?;
        Ok(url.to_string())
    }
}
