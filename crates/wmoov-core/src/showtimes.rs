//! Weekend showtime resolution
//!
//! Opens a movie's detail page in its own tab, picks each weekend date in the
//! date selector and reads the showtime table that appears.

use std::time::Duration;

use chrono::NaiveDate;
use futures::FutureExt;
use log::{debug, info, warn};

use crate::config::{ScraperConfig, Selectors};
use crate::dates::date_option_label;
use crate::driver::{with_tab, Browser, Element, Tab};
use crate::error::{Result, ScrapeError};
use crate::parser::parse_showtime_rows;
use crate::types::{Movie, RowCells, Showtime, WeekendWindow};

/// Resolve the weekend showtimes of `movie`.
///
/// Never fails: an unresolved detail link, a missing date selector or any
/// browser error yields an empty list, logged at warning level.
pub async fn resolve_showtimes<B: Browser>(
    browser: &B,
    movie: &Movie,
    window: WeekendWindow,
    config: &ScraperConfig,
) -> Vec<Showtime> {
    let Some(href) = movie.detail.href() else {
        info!("No detail page for '{}', skipping", movie.title);
        return Vec::new();
    };

    let url = match config.detail_url(href) {
        Ok(url) => url,
        Err(e) => {
            warn!("Bad detail link for '{}': {}", movie.title, e);
            return Vec::new();
        }
    };

    let selectors = config.selectors.clone();
    let settle = config.settle_delay();

    let result = with_tab(browser, move |tab| {
        async move { scrape_detail(tab, &url, window, &selectors, settle).await }.boxed()
    })
    .await;

    match result {
        Ok(showtimes) => {
            debug!("'{}': {} weekend showtimes", movie.title, showtimes.len());
            showtimes
        }
        Err(e) => {
            warn!("Failed to get showtimes for '{}': {}", movie.title, e);
            Vec::new()
        }
    }
}

async fn scrape_detail<T: Tab>(
    tab: &T,
    url: &str,
    window: WeekendWindow,
    selectors: &Selectors,
    settle: Duration,
) -> Result<Vec<Showtime>> {
    tab.goto(url).await?;

    let Some(control) = tab.find(&selectors.date_control).await? else {
        warn!("No date selector on {}", url);
        return Ok(Vec::new());
    };
    control.click().await?;

    let mut showtimes = Vec::new();
    for date in window.dates() {
        match showtimes_for_date(tab, date, selectors, settle).await {
            Ok(found) => {
                debug!("{} showtimes on {}", found.len(), date);
                showtimes.extend(found);
            }
            Err(e) => warn!("Failed to read showtimes for {} on {}: {}", date, url, e),
        }
    }

    Ok(showtimes)
}

async fn showtimes_for_date<T: Tab>(
    tab: &T,
    date: NaiveDate,
    selectors: &Selectors,
    settle: Duration,
) -> Result<Vec<Showtime>> {
    let label = date_option_label(date);

    // Looked up again per date: an option click may have loaded a new page
    let control = tab
        .find(&selectors.date_control)
        .await?
        .ok_or_else(|| ScrapeError::ElementNotFound("date selector".to_string()))?;
    let option = find_option(&control, &label, selectors)
        .await?
        .ok_or_else(|| ScrapeError::ElementNotFound(format!("date option '{}'", label)))?;
    option.click().await?;
    tab.wait(settle).await;

    let rows = read_table(tab, selectors).await?;
    Ok(parse_showtime_rows(&rows, date))
}

/// Option of `control` whose text starts with `label`
async fn find_option<E: Element>(
    control: &E,
    label: &str,
    selectors: &Selectors,
) -> Result<Option<E>> {
    for option in control.find_all(&selectors.date_option).await? {
        if option.inner_text().await?.trim().starts_with(label) {
            return Ok(Some(option));
        }
    }
    Ok(None)
}

/// Cell texts of every data row; rows without data cells are headers
async fn read_table<T: Tab>(tab: &T, selectors: &Selectors) -> Result<Vec<RowCells>> {
    let table = tab
        .find(&selectors.showtime_table)
        .await?
        .ok_or_else(|| ScrapeError::ElementNotFound("showtime table".to_string()))?;

    let mut rows = Vec::new();
    for row in table.find_all(&selectors.table_row).await? {
        let cells = row.find_all(&selectors.table_cell).await?;
        let Some(last) = cells.last() else {
            continue;
        };

        let booking_href = match last.find(&selectors.booking_link).await? {
            Some(link) => link.attribute("href").await?,
            None => None,
        };

        let mut texts = Vec::with_capacity(cells.len());
        for cell in &cells {
            texts.push(cell.inner_text().await?);
        }
        rows.push(RowCells::new(texts, booking_href));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{SnapshotBrowser, StaticPages};
    use crate::types::DetailRef;

    const SELECT: &str = r#"
        <select id="date">
          <option value="">請選擇日期</option>
          <option value="/movie/details/101/sat">10月24日 星期六</option>
          <option value="/movie/details/101/sun">10月25日 星期日</option>
        </select>"#;

    fn window() -> WeekendWindow {
        WeekendWindow {
            saturday: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            sunday: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        }
    }

    fn config() -> ScraperConfig {
        ScraperConfig {
            settle_delay_ms: 0,
            ..ScraperConfig::default()
        }
    }

    fn page(body: &str) -> String {
        format!("<html><body>{}{}</body></html>", SELECT, body)
    }

    fn pages() -> StaticPages {
        StaticPages::new()
            .with_page("https://wmoov.com/movie/details/101", page(""))
            .with_page(
                "https://wmoov.com/movie/details/101/sat",
                page(
                    r#"<table>
                      <tr><th>戲院</th><th>時間</th><th>座位</th><th>票價</th><th></th></tr>
                      <tr><td>UA 朗豪坊 (2號院)</td><td>7:30 PM</td><td>45</td><td>$110</td>
                          <td><a href="/booking/1">購票</a></td></tr>
                      <tr><td>MCL 德福戲院（1院）</td><td>11:00 AM</td><td>滿座</td><td>$85</td><td></td></tr>
                      <tr><td>壞行</td><td>1:00 PM</td><td>3</td></tr>
                    </table>"#,
                ),
            )
            .with_page(
                "https://wmoov.com/movie/details/101/sun",
                page(
                    r#"<table>
                      <tr><td>百老匯電影中心</td><td>12:15 PM</td><td>80</td><td>$95</td><td></td></tr>
                    </table>"#,
                ),
            )
            .with_page(
                "https://wmoov.com/movie/details/303",
                "<html><body><p>暫無場次</p></body></html>",
            )
    }

    fn movie(detail: DetailRef) -> Movie {
        Movie::new("沙丘", detail)
    }

    #[tokio::test]
    async fn test_resolve_showtimes_both_days() {
        let browser = SnapshotBrowser::new(pages());
        let movie = movie(DetailRef::Resolved("/movie/details/101".to_string()));

        let showtimes = resolve_showtimes(&browser, &movie, window(), &config()).await;

        assert_eq!(showtimes.len(), 3);
        assert_eq!(showtimes[0].cinema, "UA 朗豪坊");
        assert_eq!(showtimes[0].hall, "2號院");
        assert_eq!(showtimes[0].time, "19:30");
        assert_eq!(showtimes[0].date, window().saturday);
        assert_eq!(showtimes[0].booking_url.as_deref(), Some("/booking/1"));

        assert_eq!(showtimes[1].hall, "1院");
        assert_eq!(showtimes[1].available_seats, "滿座");
        assert_eq!(showtimes[1].booking_url, None);

        assert_eq!(showtimes[2].cinema, "百老匯電影中心");
        assert_eq!(showtimes[2].time, "12:15");
        assert_eq!(showtimes[2].date, window().sunday);
    }

    #[tokio::test]
    async fn test_resolve_showtimes_unresolved_detail() {
        // No pages at all: any navigation would fail
        let browser = SnapshotBrowser::new(StaticPages::new());
        let showtimes =
            resolve_showtimes(&browser, &movie(DetailRef::Unresolved), window(), &config()).await;
        assert!(showtimes.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_showtimes_without_date_selector() {
        let browser = SnapshotBrowser::new(pages());
        let movie = movie(DetailRef::Resolved("/movie/details/303".to_string()));
        let showtimes = resolve_showtimes(&browser, &movie, window(), &config()).await;
        assert!(showtimes.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_showtimes_missing_page() {
        let browser = SnapshotBrowser::new(pages());
        let movie = movie(DetailRef::Resolved("/movie/details/999".to_string()));
        let showtimes = resolve_showtimes(&browser, &movie, window(), &config()).await;
        assert!(showtimes.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_showtimes_one_date_failing() {
        // Sunday's page is missing; Saturday still counts
        let pages = StaticPages::new()
            .with_page("https://wmoov.com/movie/details/101", page(""))
            .with_page(
                "https://wmoov.com/movie/details/101/sat",
                page(r#"<table><tr><td>A 戲院</td><td>2:00 PM</td><td>5</td><td>$70</td><td></td></tr></table>"#),
            );
        let browser = SnapshotBrowser::new(pages);
        let movie = movie(DetailRef::Resolved("/movie/details/101".to_string()));

        let showtimes = resolve_showtimes(&browser, &movie, window(), &config()).await;

        assert_eq!(showtimes.len(), 1);
        assert_eq!(showtimes[0].time, "14:00");
        assert_eq!(showtimes[0].date, window().saturday);
    }

    #[tokio::test]
    async fn test_find_option_only_in_date_control() {
        let html = r#"<html><body>
            <datalist><option value="/movie/details/101/wrong">10月24日 星期六</option></datalist>
            <select>
              <option value="/movie/details/101/nov">11月2日 星期六</option>
              <option value="/movie/details/101/jan">1月2日 星期六 (早場)</option>
            </select>
        </body></html>"#;
        let browser =
            SnapshotBrowser::new(StaticPages::new().with_page("https://wmoov.com/movie/details/101", html));
        let tab = browser.open_tab().await.unwrap();
        tab.goto("https://wmoov.com/movie/details/101").await.unwrap();
        let selectors = Selectors::default();
        let control = tab.find(&selectors.date_control).await.unwrap().unwrap();

        let option = find_option(&control, "1月2日 星期六", &selectors)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            option.attribute("value").await.unwrap().as_deref(),
            Some("/movie/details/101/jan")
        );

        // Outside the date control
        let missing = find_option(&control, "10月24日 星期六", &selectors).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_read_table_ignores_header_rows() {
        let browser = SnapshotBrowser::new(pages());
        let tab = browser.open_tab().await.unwrap();
        tab.goto("https://wmoov.com/movie/details/101/sat").await.unwrap();

        let rows = read_table(&tab, &Selectors::default()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].texts[0], "UA 朗豪坊 (2號院)");
        assert_eq!(rows[2].texts.len(), 3);
    }
}
