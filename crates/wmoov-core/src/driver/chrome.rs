//! Headless Chrome engine built on chromiumoxide
//!
//! Used for the live site, whose date picker and showtime table are rendered
//! by JavaScript.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use super::{Browser, Element, Tab};
use crate::error::{Result, ScrapeError};

/// Consecutive handler errors after which the browser is considered dead
const MAX_HANDLER_ERRORS: usize = 10;

/// How long to wait for the handler task after closing the browser
const HANDLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Attribute used to hand a parent element from JavaScript back to CDP
const PARENT_MARKER_ATTR: &str = "data-wmoov-parent";

static NEXT_MARKER: AtomicU64 = AtomicU64::new(0);

/// Options for launching Chrome
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Run without a visible window (default: true)
    pub headless: bool,
    /// Quiet period after a navigation before the page counts as idle
    pub idle_grace: Duration,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            idle_grace: Duration::from_millis(500),
        }
    }
}

impl ChromeConfig {
    /// Extra command-line flags passed to Chrome
    fn launch_args(&self) -> Vec<&'static str> {
        vec!["--no-sandbox", "--disable-dev-shm-usage", "--disable-notifications"]
    }
}

/// A launched Chrome instance
pub struct ChromeBrowser {
    browser: chromiumoxide::Browser,
    handler_task: Option<JoinHandle<()>>,
    config: ChromeConfig,
}

impl ChromeBrowser {
    /// Launch Chrome and start driving its event handler
    ///
    /// # Errors
    /// Returns `ScrapeError::LaunchError` if no Chrome executable is found or
    /// the process fails to start
    pub async fn launch(config: ChromeConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        for arg in config.launch_args() {
            builder = builder.arg(arg);
        }
        let browser_config = builder.build().map_err(ScrapeError::LaunchError)?;

        info!(
            "Launching Chrome ({})",
            if config.headless { "headless" } else { "headed" }
        );
        let (browser, mut handler) = chromiumoxide::Browser::launch(browser_config)
            .await
            .map_err(|e| ScrapeError::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            let mut error_count = 0;
            while let Some(event) = handler.next().await {
                match event {
                    Ok(()) => error_count = 0,
                    Err(e) => {
                        error_count += 1;
                        warn!(
                            "Browser handler error ({}/{}): {}",
                            error_count, MAX_HANDLER_ERRORS, e
                        );
                        if error_count >= MAX_HANDLER_ERRORS {
                            error!("Browser handler giving up, Chrome has probably crashed");
                            break;
                        }
                    }
                }
            }
            debug!("Browser handler task ended");
        });

        Ok(Self {
            browser,
            handler_task: Some(handler_task),
            config,
        })
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    type Tab = ChromeTab;

    async fn open_tab(&self) -> Result<ChromeTab> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromeTab {
            page,
            idle_grace: self.config.idle_grace,
        })
    }

    async fn close(&mut self) -> Result<()> {
        info!("Closing browser");
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("Failed waiting for Chrome to exit: {}", e);
        }
        if let Some(task) = self.handler_task.take() {
            if tokio::time::timeout(HANDLER_SHUTDOWN_TIMEOUT, task).await.is_err() {
                warn!("Browser handler did not stop in time");
            }
        }
        closed?;
        Ok(())
    }
}

/// One Chrome page
pub struct ChromeTab {
    page: Page,
    idle_grace: Duration,
}

impl ChromeTab {
    fn wrap(&self, element: chromiumoxide::Element) -> ChromeElement {
        ChromeElement {
            page: self.page.clone(),
            element,
        }
    }
}

#[async_trait]
impl Tab for ChromeTab {
    type Element = ChromeElement;

    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        // CDP has no network-idle signal; give late XHRs a moment
        tokio::time::sleep(self.idle_grace).await;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromeElement>> {
        let elements = self.page.find_elements(selector).await?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page.save_screenshot(params, path).await?;
        info!("Saved screenshot to {}", path.display());
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.page.close().await?;
        Ok(())
    }
}

/// Element of a Chrome page
pub struct ChromeElement {
    page: Page,
    element: chromiumoxide::Element,
}

impl ChromeElement {
    /// Evaluate a JavaScript function with the element bound to `this`
    async fn call(&self, function: String) -> Result<Option<serde_json::Value>> {
        let returns = self.element.call_js_fn(function, false).await?;
        Ok(returns.result.value)
    }
}

#[async_trait]
impl Element for ChromeElement {
    async fn inner_text(&self) -> Result<String> {
        Ok(self.element.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.element.attribute(name).await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let elements = self.element.find_elements(selector).await?;
        Ok(elements
            .into_iter()
            .map(|element| Self {
                page: self.page.clone(),
                element,
            })
            .collect())
    }

    async fn parent(&self) -> Result<Option<Self>> {
        let marker = NEXT_MARKER.fetch_add(1, Ordering::Relaxed).to_string();
        let tagged = self
            .call(format!(
                "function() {{ const p = this.parentElement; if (!p) return false; \
                 p.setAttribute('{}', '{}'); return true; }}",
                PARENT_MARKER_ATTR, marker
            ))
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !tagged {
            return Ok(None);
        }

        let selector = format!("[{}='{}']", PARENT_MARKER_ATTR, marker);
        let element = self.page.find_elements(selector).await?.into_iter().next();
        Ok(element.map(|element| Self {
            page: self.page.clone(),
            element,
        }))
    }

    async fn click(&self) -> Result<()> {
        // Options cannot be clicked through CDP; select them and fire the
        // events a user's choice would
        let selected = self
            .call(
                "function() { \
                   if (this.tagName !== 'OPTION') return false; \
                   const select = this.closest('select'); \
                   this.selected = true; \
                   if (select) { \
                     select.value = this.value; \
                     select.dispatchEvent(new Event('input', { bubbles: true })); \
                     select.dispatchEvent(new Event('change', { bubbles: true })); \
                   } \
                   return true; }"
                    .to_string(),
            )
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if !selected {
            self.element.click().await?;
        }
        Ok(())
    }
}
