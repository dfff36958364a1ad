//! Snapshot engine: pages are fetched as static HTML and queried with `scraper`
//!
//! Works for server-rendered markup where picking a date is a link (or an
//! `<option>` whose value is a URL). Interactions that would need JavaScript
//! are no-ops.
//!
//! `scraper::Html` is not `Send`, so a tab keeps the raw HTML and every query
//! re-parses it inside a synchronous helper. Elements are addressed by their
//! position in document order.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};
use tokio::sync::Mutex;

use super::{Browser, Element, Tab};
use crate::error::{Result, ScrapeError};

/// Elements rendered on their own line
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "br", "dd", "div", "dl", "dt", "footer", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "li", "ol", "option", "p", "section", "select", "table", "tbody", "thead",
    "tr", "ul",
];

/// Elements whose text is never rendered
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Something that returns the HTML behind a URL
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// In-memory pages keyed by absolute URL, for offline replay
#[derive(Debug, Clone, Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the page served at `url`
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize_url(url), html.into());
        self
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[async_trait]
impl PageSource for StaticPages {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(&normalize_url(url))
            .cloned()
            .ok_or_else(|| ScrapeError::NotFound(url.to_string()))
    }
}

fn normalize_url(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Browser whose tabs load pages from a [`PageSource`]
pub struct SnapshotBrowser<S> {
    source: Arc<S>,
}

impl<S: PageSource + 'static> SnapshotBrowser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

#[async_trait]
impl<S: PageSource + 'static> Browser for SnapshotBrowser<S> {
    type Tab = SnapshotTab<S>;

    async fn open_tab(&self) -> Result<SnapshotTab<S>> {
        Ok(SnapshotTab {
            inner: Arc::new(TabState {
                source: self.source.clone(),
                page: Mutex::new(None),
            }),
        })
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A loaded document
#[derive(Clone)]
struct Page {
    url: Url,
    html: Arc<str>,
}

impl Page {
    /// Positions of the elements matching `selector`, searched within the
    /// element at `scope` or the whole document
    fn select(&self, scope: Option<usize>, selector: &str) -> Result<Vec<usize>> {
        let selector = parse_selector(selector)?;
        let doc = Html::parse_document(&self.html);
        let order: Vec<_> = elements(&doc).map(|el| el.id()).collect();
        let position = |el: ElementRef| order.iter().position(|id| *id == el.id());

        let found = match scope {
            None => doc.select(&selector).filter_map(position).collect(),
            Some(index) => {
                let root = self.element_at(&doc, index)?;
                root.select(&selector)
                    .filter(|el| el.id() != root.id())
                    .filter_map(position)
                    .collect()
            }
        };
        Ok(found)
    }

    /// Position of the enclosing element, `None` for the root element
    fn parent_of(&self, index: usize) -> Result<Option<usize>> {
        let doc = Html::parse_document(&self.html);
        let el = self.element_at(&doc, index)?;
        let Some(parent) = el.parent().and_then(ElementRef::wrap) else {
            return Ok(None);
        };
        let found = elements(&doc).position(|e| e.id() == parent.id());
        Ok(found)
    }

    /// Run `f` on the element at `index`
    fn with_element<R>(&self, index: usize, f: impl FnOnce(ElementRef<'_>) -> R) -> Result<R> {
        let doc = Html::parse_document(&self.html);
        let el = self.element_at(&doc, index)?;
        Ok(f(el))
    }

    fn element_at<'a>(&self, doc: &'a Html, index: usize) -> Result<ElementRef<'a>> {
        elements(doc).nth(index).ok_or_else(|| {
            ScrapeError::ElementNotFound(format!("element #{} on {}", index, self.url))
        })
    }
}

fn elements(doc: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    doc.root_element().descendants().filter_map(ElementRef::wrap)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::ParseError(format!("invalid selector '{}': {:?}", selector, e)))
}

/// Text as a browser would lay it out: whitespace collapsed, block elements
/// on separate lines, hidden elements skipped
fn rendered_text(el: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(el, &mut raw);

    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
            Node::Element(element) => {
                let name = element.name();
                if HIDDEN_TAGS.contains(&name) {
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                } else if name == "td" || name == "th" {
                    out.push(' ');
                }
                collect_text(child, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Where activating an element leads, if anywhere
fn click_target(el: ElementRef<'_>) -> Option<String> {
    let value = el.value();
    match value.name() {
        "a" => value.attr("href").map(String::from),
        "option" => value
            .attr("value")
            .filter(|v| v.starts_with('/') || v.starts_with('?') || v.contains("://"))
            .map(String::from),
        _ => None,
    }
}

struct TabState<S> {
    source: Arc<S>,
    page: Mutex<Option<Page>>,
}

impl<S: PageSource> TabState<S> {
    async fn load(&self, url: Url) -> Result<()> {
        debug!("Loading {}", url);
        let html = self.source.fetch(url.as_str()).await?;
        *self.page.lock().await = Some(Page {
            url,
            html: html.into(),
        });
        Ok(())
    }

    async fn current(&self) -> Result<Page> {
        self.page
            .lock()
            .await
            .clone()
            .ok_or_else(|| ScrapeError::BrowserError("no page loaded in tab".to_string()))
    }
}

/// Tab of a [`SnapshotBrowser`]
pub struct SnapshotTab<S> {
    inner: Arc<TabState<S>>,
}

impl<S> SnapshotTab<S> {
    fn element(&self, page: &Page, index: usize) -> SnapshotElement<S> {
        SnapshotElement {
            tab: self.inner.clone(),
            page: page.clone(),
            index,
        }
    }
}

#[async_trait]
impl<S: PageSource + 'static> Tab for SnapshotTab<S> {
    type Element = SnapshotElement<S>;

    async fn goto(&self, url: &str) -> Result<()> {
        let url = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", url, e)))?;
        self.inner.load(url).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<SnapshotElement<S>>> {
        let page = self.inner.current().await?;
        let indices = page.select(None, selector)?;
        Ok(indices.into_iter().map(|i| self.element(&page, i)).collect())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let page = self.inner.current().await?;
        tokio::fs::write(path, page.html.as_bytes()).await?;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        Ok(())
    }
}

/// Element handle bound to the page it was found on
pub struct SnapshotElement<S> {
    tab: Arc<TabState<S>>,
    page: Page,
    index: usize,
}

impl<S> SnapshotElement<S> {
    fn sibling(&self, index: usize) -> Self {
        Self {
            tab: self.tab.clone(),
            page: self.page.clone(),
            index,
        }
    }
}

#[async_trait]
impl<S: PageSource + 'static> Element for SnapshotElement<S> {
    async fn inner_text(&self) -> Result<String> {
        self.page.with_element(self.index, rendered_text)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.page
            .with_element(self.index, |el| el.value().attr(name).map(String::from))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let indices = self.page.select(Some(self.index), selector)?;
        Ok(indices.into_iter().map(|i| self.sibling(i)).collect())
    }

    async fn parent(&self) -> Result<Option<Self>> {
        Ok(self.page.parent_of(self.index)?.map(|i| self.sibling(i)))
    }

    async fn click(&self) -> Result<()> {
        let target = self.page.with_element(self.index, click_target)?;
        match target {
            Some(href) => {
                let url = self
                    .page
                    .url
                    .join(&href)
                    .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", href, e)))?;
                self.tab.load(url).await
            }
            None => {
                debug!("Click on element #{} has no effect without scripts", self.index);
                Ok(())
            }
        }
    }
}
