//! Showtime table row parser
//!
//! Turns the cell texts of one row of a detail page's showtime table into a
//! [`Showtime`]. Cells are expected in the order cinema, time, seats, price,
//! booking link.

use chrono::NaiveDate;
use log::warn;

use crate::error::{Result, ScrapeError};
use crate::types::{RowCells, Showtime};

/// A showtime row needs cinema, time, seats, price and booking cells
pub const MIN_ROW_CELLS: usize = 5;

/// Seat availability reported when the seats cell is empty
pub const UNKNOWN_SEATS: &str = "未知";

/// Parse one table row into a showtime for `date`.
///
/// # Returns
/// * `Ok(Showtime)` for a row with at least [`MIN_ROW_CELLS`] cells
/// * `Err(ScrapeError::ParseError)` for shorter rows
pub fn parse_showtime_row(row: &RowCells, date: NaiveDate) -> Result<Showtime> {
    let cells = &row.texts;
    if cells.len() < MIN_ROW_CELLS {
        return Err(ScrapeError::ParseError(format!(
            "showtime row has {} cells, expected at least {}",
            cells.len(),
            MIN_ROW_CELLS
        )));
    }

    let (cinema, hall) = split_cinema_hall(&cells[0]);

    Ok(Showtime {
        cinema,
        hall,
        time: to_24_hour(&cells[1]),
        date,
        available_seats: parse_seats(&cells[2]),
        price: parse_price(&cells[3]),
        booking_url: row.booking_href.clone(),
    })
}

/// Parse every row of a table, skipping (and logging) rows that fail.
pub fn parse_showtime_rows(rows: &[RowCells], date: NaiveDate) -> Vec<Showtime> {
    rows.iter()
        .filter_map(|row| match parse_showtime_row(row, date) {
            Ok(showtime) => Some(showtime),
            Err(e) => {
                warn!("Skipping showtime row {:?}: {}", row.texts, e);
                None
            }
        })
        .collect()
}

/// Split "UA 朗豪坊 (2號院)" into cinema "UA 朗豪坊" and hall "2號院".
///
/// Only a trailing parenthesis group (ASCII or full-width) is treated as the
/// hall; text without one is returned whole with an empty hall.
pub fn split_cinema_hall(text: &str) -> (String, String) {
    let text = text.trim();

    let parts = regex_lite::Regex::new(r"(?s)^(.*?)\s*[(（]([^()（）]*)[)）]\s*$")
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())));

    match parts {
        Some((cinema, hall)) => (cinema.trim().to_string(), hall.trim().to_string()),
        None => (text.to_string(), String::new()),
    }
}

/// Convert a 12-hour "H:MM AM/PM" time to 24-hour "HH:MM".
///
/// Text that does not contain a valid 12-hour time is returned trimmed but
/// otherwise unchanged.
///
/// # Examples
/// ```
/// use wmoov_core::parser::to_24_hour;
///
/// assert_eq!(to_24_hour("12:00 AM"), "00:00");
/// assert_eq!(to_24_hour("1:05 PM"), "13:05");
/// assert_eq!(to_24_hour("18:30"), "18:30");
/// ```
pub fn to_24_hour(text: &str) -> String {
    convert_12_hour(text).unwrap_or_else(|| text.trim().to_string())
}

fn convert_12_hour(text: &str) -> Option<String> {
    let re = regex_lite::Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").ok()?;
    let caps = re.captures(text)?;

    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let pm = caps.get(3)?.as_str().eq_ignore_ascii_case("PM");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    Some(format!("{:02}:{:02}", hour, minute))
}

/// First token of the seats cell, or [`UNKNOWN_SEATS`] when empty.
pub fn parse_seats(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or(UNKNOWN_SEATS)
        .to_string()
}

/// First number in the price cell ("HK$95", "$100.5"), 0.0 when absent.
pub fn parse_price(text: &str) -> f64 {
    regex_lite::Regex::new(r"\$?\s*(\d+(?:\.\d+)?)")
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
        .unwrap_or(0.0)
}
