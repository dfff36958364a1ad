//! Error types for the WMOOV weekend scraper
//!
//! This module defines all error types used throughout the library.
//! ScrapeError implements Serialize so failures can be emitted as JSON.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for scraping operations
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Browser could not be launched
    #[error("Failed to launch browser: {0}")]
    LaunchError(String),

    /// A browser operation (navigation, query, click) failed
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Failed to parse page content
    #[error("Failed to parse HTML: {0}")]
    ParseError(String),

    /// Required HTML element was not found
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested page was not found (HTTP 404)
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Filesystem error while writing debug output
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Results could not be encoded as JSON
    #[error("Failed to serialize results: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// The run was interrupted by the user
    #[error("Interrupted by user")]
    Interrupted,
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::BrowserError(err.to_string())
    }
}

/// Serialize ScrapeError as its display string
impl Serialize for ScrapeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for scraping operations
pub type Result<T> = std::result::Result<T, ScrapeError>;
