//! Movie title normalization for listing-page headings.

/// Headings on the listing page that are section labels, not movies
pub const NON_MOVIE_HEADINGS: [&str; 4] = ["即日上映", "即將上映", "戲院", "預告"];

/// Shortest title (in characters) accepted as a movie
const MIN_TITLE_CHARS: usize = 2;

/// Extract a canonical movie title from raw heading text.
///
/// Headings look like `「鬼滅之刃」無限城篇 熱門 主打 好評`: when a `「…」`
/// segment is present its content is the title, otherwise the first
/// whitespace-delimited token is used.
///
/// # Returns
/// * `Some(title)` for an accepted movie title
/// * `None` for section labels and titles shorter than two characters
///
/// # Examples
/// ```
/// use wmoov_core::parser::normalize_title;
///
/// assert_eq!(normalize_title("「Title A」熱門 主打"), Some("Title A".to_string()));
/// assert_eq!(normalize_title("沙丘 熱門"), Some("沙丘".to_string()));
/// assert_eq!(normalize_title("即日上映"), None);
/// ```
pub fn normalize_title(raw: &str) -> Option<String> {
    let raw = raw.trim();

    let title = match bracketed(raw) {
        Some(inner) => inner.trim(),
        None => raw.split_whitespace().next()?,
    };

    if title.chars().count() < MIN_TITLE_CHARS || NON_MOVIE_HEADINGS.contains(&title) {
        return None;
    }

    Some(title.to_string())
}

/// Content of the first `「…」` pair.
fn bracketed(text: &str) -> Option<&str> {
    let re = regex_lite::Regex::new(r"「([^」]+)」").ok()?;
    let caps = re.captures(text)?;
    Some(caps.get(1)?.as_str())
}
