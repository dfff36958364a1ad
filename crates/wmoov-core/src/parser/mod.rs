//! Text parsers for WMOOV pages
//!
//! This module contains the pure extraction logic applied to text read from
//! the browser:
//! - `title`: Normalize listing headings into movie titles
//! - `fields`: Rating, genres and popularity of a listing entry
//! - `showtime`: Showtime table rows

pub mod fields;
pub mod showtime;
pub mod title;

// Re-export main parsing functions
pub use fields::{extract_genres, extract_popularity, extract_rating, parse_rating};
pub use showtime::{
    parse_price, parse_seats, parse_showtime_row, parse_showtime_rows, split_cinema_hall,
    to_24_hour,
};
pub use title::normalize_title;
