//! Browser driver abstraction
//!
//! The scraper talks to pages through three traits so the same extraction
//! code runs against a real headless Chrome or against static HTML:
//! - `chrome`: chromiumoxide engine for JavaScript-driven pages
//! - `snapshot`: reqwest + scraper engine for server-rendered pages and tests
//!
//! Tabs are meant to be used through [`with_tab`], which guarantees the tab is
//! closed on every exit path.

pub mod chrome;
pub mod snapshot;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::warn;

use crate::error::Result;

pub use chrome::{ChromeBrowser, ChromeConfig};
pub use snapshot::{PageSource, SnapshotBrowser, StaticPages};

/// A running browser able to open isolated tabs
#[async_trait]
pub trait Browser: Send + Sync {
    type Tab: Tab;

    /// Open a fresh, empty tab
    async fn open_tab(&self) -> Result<Self::Tab>;

    /// Shut the browser down
    async fn close(&mut self) -> Result<()>;
}

/// One browsing tab
#[async_trait]
pub trait Tab: Send + Sync + Sized {
    type Element: Element;

    /// Navigate to `url` and wait until the page is idle
    async fn goto(&self, url: &str) -> Result<()>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// First element matching a CSS selector
    async fn find(&self, selector: &str) -> Result<Option<Self::Element>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// Let the page settle after an interaction
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    /// Save the current page to `path`
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Close the tab
    async fn close(self) -> Result<()>;
}

/// A handle to an element of a tab's current page
#[async_trait]
pub trait Element: Send + Sync + Sized {
    /// Rendered text content, block elements separated by newlines
    async fn inner_text(&self) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Descendants matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// First descendant matching a CSS selector
    async fn find(&self, selector: &str) -> Result<Option<Self>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    /// Enclosing element, `None` for the document root
    async fn parent(&self) -> Result<Option<Self>>;

    /// Activate the element (follow a link, pick an option, press a button)
    async fn click(&self) -> Result<()>;
}

/// Run `operation` in a dedicated tab that is closed afterwards.
///
/// The tab is closed whether the operation succeeds or fails. A failure to
/// close is logged and does not replace the operation's own result.
///
/// # Example
/// ```no_run
/// use futures::FutureExt;
/// use wmoov_core::driver::{with_tab, Browser, Tab};
///
/// # async fn example<B: Browser>(browser: &B) -> wmoov_core::Result<usize> {
/// let count = with_tab(browser, |tab| {
///     async move {
///         tab.goto("https://wmoov.com/movie/showing").await?;
///         Ok(tab.find_all("h3").await?.len())
///     }
///     .boxed()
/// })
/// .await?;
/// # Ok(count)
/// # }
/// ```
pub async fn with_tab<B, F, R>(browser: &B, operation: F) -> Result<R>
where
    B: Browser,
    F: for<'t> FnOnce(&'t B::Tab) -> BoxFuture<'t, Result<R>>,
{
    let tab = browser.open_tab().await?;

    let result = operation(&tab).await;

    if let Err(e) = tab.close().await {
        warn!("Failed to close tab: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        closed: AtomicUsize,
    }

    struct CountingBrowser {
        counters: Arc<Counters>,
        fail_close: bool,
    }

    struct CountingTab {
        counters: Arc<Counters>,
        fail_close: bool,
    }

    struct NoElement;

    #[async_trait]
    impl Element for NoElement {
        async fn inner_text(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn attribute(&self, _name: &str) -> Result<Option<String>> {
            Ok(None)
        }
        async fn find_all(&self, _selector: &str) -> Result<Vec<Self>> {
            Ok(Vec::new())
        }
        async fn parent(&self) -> Result<Option<Self>> {
            Ok(None)
        }
        async fn click(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Tab for CountingTab {
        type Element = NoElement;

        async fn goto(&self, url: &str) -> Result<()> {
            Err(ScrapeError::BrowserError(format!("cannot reach {}", url)))
        }
        async fn find_all(&self, _selector: &str) -> Result<Vec<NoElement>> {
            Ok(vec![NoElement, NoElement])
        }
        async fn screenshot(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
        async fn close(self) -> Result<()> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(ScrapeError::BrowserError("close failed".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Browser for CountingBrowser {
        type Tab = CountingTab;

        async fn open_tab(&self) -> Result<CountingTab> {
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(CountingTab {
                counters: self.counters.clone(),
                fail_close: self.fail_close,
            })
        }
        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn browser(fail_close: bool) -> (CountingBrowser, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let browser = CountingBrowser {
            counters: counters.clone(),
            fail_close,
        };
        (browser, counters)
    }

    #[tokio::test]
    async fn test_with_tab_closes_after_success() {
        let (browser, counters) = browser(false);

        let found = with_tab(&browser, |tab| {
            async move { Ok(tab.find_all("h3").await?.len()) }.boxed()
        })
        .await
        .unwrap();

        assert_eq!(found, 2);
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_tab_closes_after_failure() {
        let (browser, counters) = browser(false);

        let result: Result<()> = with_tab(&browser, |tab| {
            async move { tab.goto("https://wmoov.com/").await }.boxed()
        })
        .await;

        assert!(matches!(result, Err(ScrapeError::BrowserError(_))));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_tab_close_failure_keeps_result() {
        let (browser, counters) = browser(true);

        let result = with_tab(&browser, |_tab| async move { Ok(7) }.boxed()).await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tab_find_returns_first() {
        let (browser, _) = browser(false);
        let tab = browser.open_tab().await.unwrap();
        assert!(tab.find("h3").await.unwrap().is_some());
    }
}
