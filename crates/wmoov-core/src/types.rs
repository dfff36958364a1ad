//! Data types for the WMOOV weekend scraper
//!
//! This module contains the core data structures produced by a scrape pass.
//! All types implement Serialize and Deserialize so results can be emitted as JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reference to a movie's detail page as found on the listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailRef {
    /// A real link target taken from the listing page (usually a relative path)
    Resolved(String),
    /// No link was found next to the heading
    Unresolved,
}

impl DetailRef {
    /// Link target, if one was found
    pub fn href(&self) -> Option<&str> {
        match self {
            DetailRef::Resolved(href) => Some(href),
            DetailRef::Unresolved => None,
        }
    }
}

/// One screening of a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    /// Cinema name with the hall suffix stripped
    pub cinema: String,
    /// Hall or house inside the cinema, empty if not given
    pub hall: String,
    /// Start time as 24-hour "HH:MM", or the raw cell text if it could not be parsed
    pub time: String,
    /// Screening date (one of the weekend dates)
    pub date: NaiveDate,
    /// Seat availability as shown by the site (not always numeric)
    pub available_seats: String,
    /// Ticket price, 0.0 if none was shown
    pub price: f64,
    /// Booking link, if the row carried one
    pub booking_url: Option<String>,
}

/// A movie from the listing page together with its weekend showtimes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Normalized title
    pub title: String,
    /// Site rating, None if the listing shows none
    pub rating: Option<f32>,
    /// Genres in listing order
    pub genres: Vec<String>,
    /// Popularity count shown on the listing
    pub popularity: u64,
    /// Where the detail page lives
    pub detail: DetailRef,
    /// Weekend showtimes, filled in after the detail page is scraped
    pub showtimes: Vec<Showtime>,
}

impl Movie {
    /// Create a movie with no metadata and no showtimes yet
    pub fn new(title: impl Into<String>, detail: DetailRef) -> Self {
        Self {
            title: title.into(),
            rating: None,
            genres: Vec::new(),
            popularity: 0,
            detail,
            showtimes: Vec::new(),
        }
    }

    /// Lowest and highest ticket price over all showtimes
    pub fn price_range(&self) -> Option<(f64, f64)> {
        let mut prices = self.showtimes.iter().map(|s| s.price);
        let first = prices.next()?;
        Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// The Saturday and Sunday targeted by one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendWindow {
    pub saturday: NaiveDate,
    pub sunday: NaiveDate,
}

impl WeekendWindow {
    /// Both dates in order
    pub fn dates(&self) -> [NaiveDate; 2] {
        [self.saturday, self.sunday]
    }
}

/// Texts of one showtime table row, plus the booking link of its last cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCells {
    pub texts: Vec<String>,
    pub booking_href: Option<String>,
}

impl RowCells {
    pub fn new<I, S>(texts: I, booking_href: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
            booking_href,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn showtime(price: f64) -> Showtime {
        Showtime {
            cinema: "UA 朗豪坊".to_string(),
            hall: "2號院".to_string(),
            time: "19:30".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            available_seats: "120".to_string(),
            price,
            booking_url: None,
        }
    }

    #[test]
    fn test_detail_ref_serialization() {
        let resolved = DetailRef::Resolved("/movie/details/101".to_string());
        let json = serde_json::to_string(&resolved).unwrap();
        assert_eq!(json, "{\"Resolved\":\"/movie/details/101\"}");

        let json = serde_json::to_string(&DetailRef::Unresolved).unwrap();
        assert_eq!(json, "\"Unresolved\"");
    }

    #[test]
    fn test_detail_ref_href() {
        assert_eq!(
            DetailRef::Resolved("/movie/details/7".to_string()).href(),
            Some("/movie/details/7")
        );
        assert_eq!(DetailRef::Unresolved.href(), None);
    }

    #[test]
    fn test_showtime_date_serializes_as_iso() {
        let json = serde_json::to_value(showtime(95.0)).unwrap();
        assert_eq!(json["date"], "2026-10-24");
        assert_eq!(json["booking_url"], serde_json::Value::Null);
    }

    #[test]
    fn test_movie_new_defaults() {
        let movie = Movie::new("沙丘", DetailRef::Unresolved);
        assert_eq!(movie.title, "沙丘");
        assert_eq!(movie.rating, None);
        assert!(movie.genres.is_empty());
        assert_eq!(movie.popularity, 0);
        assert!(movie.showtimes.is_empty());
    }

    #[test]
    fn test_movie_price_range() {
        let mut movie = Movie::new("沙丘", DetailRef::Unresolved);
        assert_eq!(movie.price_range(), None);

        movie.showtimes = vec![showtime(100.0), showtime(75.0), showtime(120.0)];
        assert_eq!(movie.price_range(), Some((75.0, 120.0)));
    }

    #[test]
    fn test_weekend_window_dates_order() {
        let window = WeekendWindow {
            saturday: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            sunday: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        };
        assert_eq!(window.dates(), [window.saturday, window.sunday]);
    }
}
