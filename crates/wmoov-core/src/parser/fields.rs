//! Metadata extractors for listing-page movie entries
//!
//! Rating, genres and popularity are pulled out of text belonging to a single
//! movie's container. Every extractor is best-effort: missing or malformed
//! text yields the documented default, never an error.

/// Label preceding the genre list, e.g. "片種: 動作, 冒險"
pub const GENRE_LABEL: &str = "片種";

/// Label preceding the popularity count, e.g. "人氣: 12,345"
pub const POPULARITY_LABEL: &str = "人氣";

/// Parse a rating from text that consists only of a number.
///
/// Accepts digits with at most one decimal point, surrounding whitespace
/// ignored. Anything else (labels, units, multiple dots) is rejected.
///
/// # Examples
/// ```
/// use wmoov_core::parser::parse_rating;
///
/// assert_eq!(parse_rating("8.5"), Some(8.5));
/// assert_eq!(parse_rating(" 7 "), Some(7.0));
/// assert_eq!(parse_rating("評分 8.5"), None);
/// ```
pub fn parse_rating(text: &str) -> Option<f32> {
    let text = text.trim();

    let numeric_only = text.chars().all(|c| c.is_ascii_digit() || c == '.');
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    if !numeric_only || !has_digit || text.matches('.').count() > 1 {
        return None;
    }

    text.parse().ok()
}

/// Pick the rating from candidate texts; the first numeric-only one wins.
///
/// # Returns
/// * `Some(rating)` from the first candidate accepted by [`parse_rating`]
/// * `None` when no candidate is a plain number
pub fn extract_rating<I, S>(candidates: I) -> Option<f32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .find_map(|text| parse_rating(text.as_ref()))
}

/// Extract the genre list from a movie entry's text.
///
/// Looks for a line containing `片種:` (ASCII or full-width colon) and splits
/// the rest of that line on commas.
///
/// # Examples
/// ```
/// use wmoov_core::parser::extract_genres;
///
/// assert_eq!(extract_genres("片種: 動作, 冒險"), vec!["動作", "冒險"]);
/// assert!(extract_genres("導演: 維倫紐夫").is_empty());
/// ```
pub fn extract_genres(text: &str) -> Vec<String> {
    let pattern = format!(r"{}\s*[:：]([^\n]*)", GENRE_LABEL);
    let Ok(re) = regex_lite::Regex::new(&pattern) else {
        return Vec::new();
    };

    let Some(list) = re.captures(text).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };

    list.as_str()
        .split([',', '，'])
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(String::from)
        .collect()
}

/// Extract the popularity count from a movie entry's text.
///
/// Thousands separators are stripped; a missing or unparseable count is 0.
///
/// # Examples
/// ```
/// use wmoov_core::parser::extract_popularity;
///
/// assert_eq!(extract_popularity("人氣: 12,345"), 12345);
/// assert_eq!(extract_popularity("no count"), 0);
/// ```
pub fn extract_popularity(text: &str) -> u64 {
    parse_popularity(text).unwrap_or(0)
}

fn parse_popularity(text: &str) -> Option<u64> {
    let pattern = format!(r"{}\s*[:：]\s*([\d,]+)", POPULARITY_LABEL);
    let re = regex_lite::Regex::new(&pattern).ok()?;
    let digits = re.captures(text)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}
