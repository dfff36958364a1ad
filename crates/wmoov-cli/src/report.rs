//! Console and JSON rendering of a weekend scrape
//!
//! All renderers return strings; `main` decides where they go.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use wmoov_core::{Movie, Showtime, WeekendWindow};

const TITLE_MAX_CHARS: usize = 29;
const LIST_PREVIEW: usize = 3;
const TIMES_PER_CINEMA: usize = 2;
const SHOWTIME_LINES: usize = 4;

/// (header, width) of each overview column
const COLUMNS: [(&str, usize); 6] = [
    ("Movie Title", 30),
    ("Rating", 8),
    ("Genres", 20),
    ("Cinemas", 25),
    ("Showtimes", 30),
    ("Price Range", 12),
];

/// Everything shown for one run
#[derive(Debug, Serialize)]
pub struct WeekendReport<'a> {
    pub scraped_at: DateTime<FixedOffset>,
    pub weekend: WeekendWindow,
    pub total_movies: usize,
    pub total_showtimes: usize,
    pub movies: &'a [Movie],
}

impl<'a> WeekendReport<'a> {
    pub fn new(movies: &'a [Movie], weekend: WeekendWindow, scraped_at: DateTime<FixedOffset>) -> Self {
        Self {
            scraped_at,
            weekend,
            total_movies: movies.len(),
            total_showtimes: movies.iter().map(|m| m.showtimes.len()).sum(),
            movies,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Overview table, summary and one detail block per movie
    pub fn render(&self) -> String {
        if self.movies.is_empty() {
            return render_no_movies();
        }

        let mut out = render_overview(self.movies);
        out.push('\n');
        out.push_str(&self.render_summary());
        for movie in self.movies {
            out.push('\n');
            out.push_str(&render_movie_detail(movie));
        }
        out
    }

    pub fn render_summary(&self) -> String {
        format!(
            "Summary\n  Weekend: {} to {}\n  Total Movies: {}\n  Total Showtimes: {}\n  Scraped: {}\n",
            self.weekend.saturday,
            self.weekend.sunday,
            self.total_movies,
            self.total_showtimes,
            self.scraped_at.format("%Y-%m-%d %H:%M")
        )
    }
}

pub fn render_overview(movies: &[Movie]) -> String {
    let mut out = String::from("Weekend Movies - WMOOV\n");

    let header: Vec<Vec<String>> = COLUMNS.iter().map(|(h, _)| vec![h.to_string()]).collect();
    out.push_str(&table_row(&header));
    out.push_str(&separator());

    for movie in movies {
        out.push_str(&table_row(&overview_cells(movie)));
    }
    out.push_str(&separator());
    out
}

pub fn render_movie_detail(movie: &Movie) -> String {
    let mut out = format!("== {} ==\n", movie.title);
    if let Some(rating) = movie.rating {
        out.push_str(&format!("Rating: {}\n", rating));
    }
    if !movie.genres.is_empty() {
        out.push_str(&format!("Genres: {}\n", movie.genres.join(", ")));
    }

    out.push_str("Showtimes:\n");
    for (cinema, showtimes) in by_cinema(&movie.showtimes) {
        out.push_str(&format!("  {}\n", cinema));
        for showtime in showtimes {
            out.push_str(&format!(
                "    {} - ${} ({})\n",
                showtime.time, showtime.price, showtime.available_seats
            ));
        }
    }
    out
}

pub fn render_error(message: &str) -> String {
    format!("Error: {}", message)
}

pub fn render_no_movies() -> String {
    "No movies found with weekend showtimes.\n".to_string()
}

fn overview_cells(movie: &Movie) -> Vec<Vec<String>> {
    let groups = by_cinema(&movie.showtimes);

    let cinemas = preview(groups.iter().map(|(cinema, _)| *cinema));

    let showtimes: Vec<String> = groups
        .iter()
        .flat_map(|(cinema, showtimes)| {
            showtimes
                .iter()
                .take(TIMES_PER_CINEMA)
                .map(move |s| format!("{}: {}", cinema, s.time))
        })
        .take(SHOWTIME_LINES)
        .collect();

    vec![
        vec![truncate(&movie.title, TITLE_MAX_CHARS)],
        vec![rating_label(movie.rating)],
        vec![preview(movie.genres.iter().map(String::as_str))],
        vec![cinemas],
        showtimes,
        vec![price_label(movie.price_range())],
    ]
}

fn rating_label(rating: Option<f32>) -> String {
    rating.map_or_else(|| "N/A".to_string(), |r| r.to_string())
}

fn price_label(range: Option<(f64, f64)>) -> String {
    match range {
        Some((min, max)) if min != max => format!("${}-{}", min, max),
        Some((price, _)) => format!("${}", price),
        None => String::new(),
    }
}

/// First few items joined, with "..." when some were left out
fn preview<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let items: Vec<&str> = items.collect();
    let mut joined = items
        .iter()
        .take(LIST_PREVIEW)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if items.len() > LIST_PREVIEW {
        joined.push_str("...");
    }
    joined
}

/// Showtimes grouped by cinema, cinemas in first-seen order
fn by_cinema(showtimes: &[Showtime]) -> Vec<(&str, Vec<&Showtime>)> {
    let mut groups: Vec<(&str, Vec<&Showtime>)> = Vec::new();
    for showtime in showtimes {
        match groups.iter_mut().find(|(cinema, _)| *cinema == showtime.cinema) {
            Some((_, group)) => group.push(showtime),
            None => groups.push((showtime.cinema.as_str(), vec![showtime])),
        }
    }
    groups
}

fn table_row(cells: &[Vec<String>]) -> String {
    let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut out = String::new();

    for line in 0..height {
        let parts: Vec<String> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(cell, (_, width))| {
                let text = cell.get(line).map(String::as_str).unwrap_or("");
                pad(&fit(text, *width), *width)
            })
            .collect();
        out.push_str(parts.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

fn separator() -> String {
    let parts: Vec<String> = COLUMNS.iter().map(|(_, width)| "-".repeat(*width)).collect();
    format!("{}\n", parts.join("-+-"))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Cut `text` to fit `width` terminal columns
fn fit(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += char_width(*c);
            used <= width
        })
        .collect()
}

fn pad(text: &str, width: usize) -> String {
    let used = display_width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// CJK and full-width forms take two terminal columns
fn char_width(c: char) -> usize {
    match c as u32 {
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6 => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use wmoov_core::DetailRef;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn showtime(cinema: &str, time: &str, price: f64, seats: &str) -> Showtime {
        Showtime {
            cinema: cinema.to_string(),
            hall: String::new(),
            time: time.to_string(),
            date: date(24),
            available_seats: seats.to_string(),
            price,
            booking_url: None,
        }
    }

    fn dune() -> Movie {
        let mut movie = Movie::new("沙丘：第二章", DetailRef::Resolved("/movie/details/1".into()));
        movie.rating = Some(8.7);
        movie.genres = vec!["科幻".into(), "冒險".into(), "劇情".into(), "動作".into()];
        movie.showtimes = vec![
            showtime("UA 朗豪坊", "19:30", 110.0, "45"),
            showtime("MCL 德福", "12:00", 85.0, "未知"),
            showtime("UA 朗豪坊", "21:45", 110.0, "60"),
            showtime("UA 朗豪坊", "23:59", 110.0, "80"),
            showtime("百老匯", "14:00", 95.5, "12"),
            showtime("英皇", "16:00", 100.0, "30"),
        ];
        movie
    }

    fn window() -> WeekendWindow {
        WeekendWindow {
            saturday: date(24),
            sunday: date(25),
        }
    }

    fn scraped_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 20, 14, 5, 0)
            .unwrap()
    }

    #[test]
    fn test_overview_cells() {
        let cells = overview_cells(&dune());

        assert_eq!(cells[0], vec!["沙丘：第二章"]);
        assert_eq!(cells[1], vec!["8.7"]);
        assert_eq!(cells[2], vec!["科幻, 冒險, 劇情..."]);
        assert_eq!(cells[3], vec!["UA 朗豪坊, MCL 德福, 百老匯..."]);
        assert_eq!(
            cells[4],
            vec![
                "UA 朗豪坊: 19:30",
                "UA 朗豪坊: 21:45",
                "MCL 德福: 12:00",
                "百老匯: 14:00"
            ]
        );
        assert_eq!(cells[5], vec!["$85-110"]);
    }

    #[test]
    fn test_overview_labels() {
        assert_eq!(rating_label(None), "N/A");
        assert_eq!(price_label(Some((95.5, 95.5))), "$95.5");
        assert_eq!(price_label(None), "");
        assert_eq!(truncate(&"長".repeat(40), TITLE_MAX_CHARS).chars().count(), 29);
    }

    #[test]
    fn test_render_overview_rows_span_showtime_lines() {
        let table = render_overview(&[dune()]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Weekend Movies - WMOOV");
        assert!(lines[1].starts_with("Movie Title"));
        // Header, separator, four showtime lines, closing separator
        assert_eq!(lines.len(), 8);
        assert!(lines[3].starts_with("沙丘：第二章"));
        assert!(lines[6].contains("百老匯: 14:00"));
    }

    #[test]
    fn test_render_movie_detail_groups_by_cinema() {
        let detail = render_movie_detail(&dune());
        let expected_start = "== 沙丘：第二章 ==\nRating: 8.7\nGenres: 科幻, 冒險, 劇情, 動作\nShowtimes:\n  UA 朗豪坊\n    19:30 - $110 (45)\n    21:45 - $110 (60)\n    23:59 - $110 (80)\n  MCL 德福\n    12:00 - $85 (未知)\n";
        assert!(detail.starts_with(expected_start), "{}", detail);
    }

    #[test]
    fn test_render_summary() {
        let movies = vec![dune()];
        let report = WeekendReport::new(&movies, window(), scraped_at());

        assert_eq!(
            report.render_summary(),
            "Summary\n  Weekend: 2026-10-24 to 2026-10-25\n  Total Movies: 1\n  Total Showtimes: 6\n  Scraped: 2026-10-20 14:05\n"
        );
    }

    #[test]
    fn test_render_empty_report() {
        let report = WeekendReport::new(&[], window(), scraped_at());
        assert_eq!(report.render(), render_no_movies());
        assert_eq!(render_error("boom"), "Error: boom");
    }

    #[test]
    fn test_report_json() {
        let movies = vec![dune()];
        let json = WeekendReport::new(&movies, window(), scraped_at())
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["total_movies"], 1);
        assert_eq!(value["total_showtimes"], 6);
        assert_eq!(value["weekend"]["saturday"], "2026-10-24");
        assert_eq!(value["movies"][0]["title"], "沙丘：第二章");
        assert_eq!(value["movies"][0]["showtimes"][0]["date"], "2026-10-24");
        assert_eq!(value["scraped_at"], "2026-10-20T14:05:00+08:00");
    }

    #[test]
    fn test_display_width_counts_wide_chars() {
        assert_eq!(display_width("UA 朗豪坊"), 9);
        assert_eq!(pad("沙丘", 6), "沙丘  ");
        assert_eq!(fit("沙丘沙丘", 5), "沙丘");
    }
}
