//! Main weekend scraper API
//!
//! This module ties the pieces together: it loads the listing page, extracts
//! the movies and resolves each movie's weekend showtimes, one movie at a time.

use futures::FutureExt;
use log::{error, info, warn};

use crate::client::PageClient;
use crate::config::ScraperConfig;
use crate::dates::{today_in, weekend_for};
use crate::driver::{with_tab, Browser, ChromeBrowser, ChromeConfig, SnapshotBrowser, Tab};
use crate::error::Result;
use crate::listing::extract_listing;
use crate::showtimes::resolve_showtimes;
use crate::types::{Movie, WeekendWindow};

/// Scraper for one site, driving one browser
///
/// # Example
/// ```no_run
/// use wmoov_core::{ScraperConfig, WeekendScraper};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scraper = WeekendScraper::over_http(ScraperConfig::default())?;
///
///     let window = scraper.upcoming_weekend()?;
///     let movies = scraper.scrape_weekend(window).await?;
///     println!("{} movies showing this weekend", movies.len());
///
///     scraper.close().await?;
///     Ok(())
/// }
/// ```
pub struct WeekendScraper<B: Browser> {
    browser: B,
    config: ScraperConfig,
}

impl WeekendScraper<ChromeBrowser> {
    /// Launch Chrome and build a scraper on top of it.
    ///
    /// # Errors
    /// Returns `ScrapeError::LaunchError` if Chrome cannot be started.
    pub async fn launch(config: ScraperConfig, chrome: ChromeConfig) -> Result<Self> {
        let browser = ChromeBrowser::launch(chrome).await?;
        Ok(Self::new(browser, config))
    }
}

impl WeekendScraper<SnapshotBrowser<PageClient>> {
    /// Build a scraper that fetches static HTML over HTTP.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn over_http(config: ScraperConfig) -> Result<Self> {
        let browser = SnapshotBrowser::new(PageClient::new()?);
        Ok(Self::new(browser, config))
    }
}

impl<B: Browser> WeekendScraper<B> {
    pub fn new(browser: B, config: ScraperConfig) -> Self {
        Self { browser, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// The weekend to scrape, based on today's date at the configured offset.
    pub fn upcoming_weekend(&self) -> Result<WeekendWindow> {
        Ok(weekend_for(today_in(self.config.utc_offset()?)))
    }

    /// Scrape the movies showing on `window`'s dates.
    ///
    /// Only movies with at least one weekend showtime are returned, in
    /// listing order.
    ///
    /// # Errors
    /// Fails only if the listing page cannot be loaded or queried. Problems
    /// with individual movies are logged and the movie is left out.
    pub async fn scrape_weekend(&self, window: WeekendWindow) -> Result<Vec<Movie>> {
        let listing_url = self.config.listing_url()?;
        info!(
            "Scraping {} for {} - {}",
            listing_url, window.saturday, window.sunday
        );

        let selectors = self.config.selectors.clone();
        let limit = self.config.limit;
        let screenshot = self.config.screenshot.clone();

        let movies = with_tab(&self.browser, move |tab| {
            async move {
                tab.goto(&listing_url).await?;

                if let Some(path) = &screenshot {
                    if let Err(e) = tab.screenshot(path).await {
                        warn!("Failed to save screenshot to {}: {}", path.display(), e);
                    }
                }

                extract_listing(tab, &selectors, limit).await
            }
            .boxed()
        })
        .await
        .map_err(|e| {
            error!("Failed to load listing page: {}", e);
            e
        })?;

        let total = movies.len();
        let mut showing = Vec::new();
        for (i, mut movie) in movies.into_iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, movie.title);

            movie.showtimes = resolve_showtimes(&self.browser, &movie, window, &self.config).await;
            if movie.showtimes.is_empty() {
                info!("No weekend showtimes for '{}'", movie.title);
            } else {
                showing.push(movie);
            }
        }

        info!("{} of {} movies have weekend showtimes", showing.len(), total);
        Ok(showing)
    }

    /// Shut the browser down.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::StaticPages;
    use crate::error::ScrapeError;
    use chrono::NaiveDate;

    const LISTING: &str = r#"
        <html><body>
          <div><h3><a href="/movie/details/1">「沙丘」</a></h3><p>人氣: 900</p></div>
          <div><h3><a href="/movie/details/2">「奧本海默」</a></h3></div>
          <div><h3>Wonka</h3></div>
        </body></html>"#;

    const DETAIL_WITH_SHOWS: &str = r#"
        <html><body>
          <select><option value="/movie/details/1/sat">10月24日 星期六</option></select>
        </body></html>"#;

    const SATURDAY: &str = r#"
        <html><body>
          <table><tr><td>UA 朗豪坊 (2號院)</td><td>7:30 PM</td><td>45</td><td>$110</td><td></td></tr></table>
        </body></html>"#;

    fn window() -> WeekendWindow {
        weekend_for(NaiveDate::from_ymd_opt(2026, 10, 21).unwrap())
    }

    fn scraper(pages: StaticPages) -> WeekendScraper<SnapshotBrowser<StaticPages>> {
        let config = ScraperConfig {
            settle_delay_ms: 0,
            ..ScraperConfig::default()
        };
        WeekendScraper::new(SnapshotBrowser::new(pages), config)
    }

    fn site() -> StaticPages {
        StaticPages::new()
            .with_page("https://wmoov.com/movie/showing", LISTING)
            .with_page("https://wmoov.com/movie/details/1", DETAIL_WITH_SHOWS)
            .with_page("https://wmoov.com/movie/details/1/sat", SATURDAY)
            .with_page(
                "https://wmoov.com/movie/details/2",
                "<html><body><p>暫無場次</p></body></html>",
            )
    }

    #[tokio::test]
    async fn test_scrape_weekend_keeps_movies_with_showtimes() {
        let scraper = scraper(site());

        let movies = scraper.scrape_weekend(window()).await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "沙丘");
        assert_eq!(movies[0].popularity, 900);
        assert_eq!(movies[0].showtimes.len(), 1);
        assert_eq!(movies[0].showtimes[0].time, "19:30");

        scraper.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_scrape_weekend_listing_failure_is_fatal() {
        let scraper = scraper(StaticPages::new());
        let result = scraper.scrape_weekend(window()).await;
        assert!(matches!(result, Err(ScrapeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_scrape_weekend_saves_screenshot() {
        let path = std::env::temp_dir().join(format!("wmoov-listing-{}.html", std::process::id()));
        let mut scraper = scraper(site());
        scraper.config.screenshot = Some(path.clone());
        scraper.config.limit = Some(1);

        let movies = scraper.scrape_weekend(window()).await.unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(movies.len(), 1);
        assert_eq!(saved, LISTING);
    }

    #[test]
    fn test_upcoming_weekend_is_saturday_sunday() {
        use chrono::{Datelike, Weekday};

        let scraper = scraper(StaticPages::new());
        let window = scraper.upcoming_weekend().unwrap();
        assert_eq!(window.saturday.weekday(), Weekday::Sat);
        assert_eq!(window.sunday.weekday(), Weekday::Sun);
    }
}
