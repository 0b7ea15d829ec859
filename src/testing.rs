//! An in-memory stand-in for a browser tab.
//!
//! [`ScriptedPage`] plays back scripted result feeds so the feed loader and
//! the orchestrator can be exercised without a WebDriver. Feeds are matched
//! by a substring of the navigated URL, e.g. `"widgets%20Aville"`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{
    configuration::ScraperSettings,
    error::{Result, ScrapeError},
    services::{MapsPage, ScrollKey},
};

const DEFAULT_END_MARKER: &str = "You've reached the end of the list.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedEntry {
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
}

impl ScriptedEntry {
    pub fn named(name: &str) -> Self {
        ScriptedEntry {
            name: name.to_string(),
            website: None,
            phone: None,
        }
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(website.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

/// How the loading spinner behaves after each scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingIndicator {
    /// Shows up and goes away again.
    Clears,
    /// Never shows up.
    Absent,
    /// Shows up and never goes away.
    Stuck,
}

/// One query's worth of results.
#[derive(Debug, Clone)]
pub struct ScriptedFeed {
    entries: Vec<ScriptedEntry>,
    growth: Vec<usize>,
    end_marker_after: Option<usize>,
    end_marker_text: String,
    feed_missing: bool,
    indicator: LoadingIndicator,
}

impl ScriptedFeed {
    /// All entries are loaded from the first read on.
    pub fn new(names: &[&str]) -> Self {
        Self::with_entries(names.iter().map(|name| ScriptedEntry::named(name)).collect())
    }

    pub fn with_entries(entries: Vec<ScriptedEntry>) -> Self {
        ScriptedFeed {
            growth: vec![entries.len()],
            entries,
            end_marker_after: None,
            end_marker_text: DEFAULT_END_MARKER.to_string(),
            feed_missing: false,
            indicator: LoadingIndicator::Clears,
        }
    }

    /// Entry counts reported on successive reads; the last one repeats.
    pub fn with_growth(mut self, growth: Vec<usize>) -> Self {
        self.growth = growth;
        self
    }

    /// The end-of-list marker is present from the `reads`-th count onwards.
    pub fn with_end_marker_after(mut self, reads: usize) -> Self {
        self.end_marker_after = Some(reads);
        self
    }

    pub fn with_end_marker_text(mut self, text: &str) -> Self {
        self.end_marker_text = text.to_string();
        self
    }

    /// The page loads but the result feed never appears.
    pub fn without_feed(mut self) -> Self {
        self.feed_missing = true;
        self
    }

    pub fn without_loading_indicator(mut self) -> Self {
        self.indicator = LoadingIndicator::Absent;
        self
    }

    pub fn with_stuck_indicator(mut self) -> Self {
        self.indicator = LoadingIndicator::Stuck;
        self
    }

    fn count_at(&self, read: usize) -> usize {
        match self.growth.is_empty() {
            true => self.entries.len(),
            false => self.growth[read.min(self.growth.len() - 1)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Navigate(String),
    WaitFor(String),
    WaitForHidden(String),
    Count(String),
    ElementText(String),
    ScrollToEnd(String),
    ScrollWindowBy(i64),
    PressKey(ScrollKey),
    PageSource,
}

struct ActiveFeed {
    url: String,
    feed: ScriptedFeed,
    reads: usize,
    loaded: usize,
}

pub struct ScriptedPage {
    loading_selector: String,
    feeds: Vec<(String, ScriptedFeed)>,
    failing: Vec<String>,
    active: Mutex<Option<ActiveFeed>>,
    calls: Mutex<Vec<PageCall>>,
}

impl Default for ScriptedPage {
    fn default() -> Self {
        ScriptedPage {
            loading_selector: ScraperSettings::default().loading_selector,
            feeds: Vec::new(),
            failing: Vec::new(),
            active: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url_needle: &str, feed: ScriptedFeed) -> Self {
        self.feeds.push((url_needle.to_string(), feed));
        self
    }

    /// Navigating to any URL containing `url_needle` fails.
    pub fn failing_navigation(mut self, url_needle: &str) -> Self {
        self.failing.push(url_needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PageCall::Navigate(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PageCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn with_active<T>(&self, f: impl FnOnce(&mut ActiveFeed) -> T) -> Result<T> {
        let mut active = self.active.lock().unwrap();
        match active.as_mut() {
            Some(feed) => Ok(f(feed)),
            None => Err(ScrapeError::Script("no page loaded".to_string())),
        }
    }
}

#[async_trait]
impl MapsPage for ScriptedPage {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.record(PageCall::Navigate(url.to_string()));
        *self.active.lock().unwrap() = None;

        if self.failing.iter().any(|needle| url.contains(needle)) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let feed = self
            .feeds
            .iter()
            .find(|(needle, _)| url.contains(needle))
            .map(|(_, feed)| feed.clone())
            .ok_or_else(|| ScrapeError::Navigation {
                url: url.to_string(),
                reason: "no scripted feed".to_string(),
            })?;

        *self.active.lock().unwrap() = Some(ActiveFeed {
            url: url.to_string(),
            feed,
            reads: 0,
            loaded: 0,
        });
        Ok(())
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.record(PageCall::WaitFor(selector.to_string()));
        let present = self.with_active(|active| match selector == self.loading_selector {
            true => active.feed.indicator != LoadingIndicator::Absent,
            false => !active.feed.feed_missing,
        })?;
        match present {
            true => Ok(()),
            false => Err(ScrapeError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            }),
        }
    }

    async fn wait_for_element_hidden(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.record(PageCall::WaitForHidden(selector.to_string()));
        let stuck = selector == self.loading_selector
            && self.with_active(|active| active.feed.indicator == LoadingIndicator::Stuck)?;
        match stuck {
            true => Err(ScrapeError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            }),
            false => Ok(()),
        }
    }

    async fn count_elements(&self, selector: &str) -> Result<usize> {
        self.record(PageCall::Count(selector.to_string()));
        self.with_active(|active| {
            let count = active.feed.count_at(active.reads);
            active.reads += 1;
            active.loaded = count.min(active.feed.entries.len());
            count
        })
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>> {
        self.record(PageCall::ElementText(selector.to_string()));
        self.with_active(|active| match active.feed.end_marker_after {
            Some(after) if active.reads >= after => Some(active.feed.end_marker_text.clone()),
            _ => None,
        })
    }

    async fn scroll_to_end(&self, selector: &str) -> Result<()> {
        self.record(PageCall::ScrollToEnd(selector.to_string()));
        Ok(())
    }

    async fn scroll_window_by(&self, dy: i64) -> Result<()> {
        self.record(PageCall::ScrollWindowBy(dy));
        Ok(())
    }

    async fn press_key(&self, key: ScrollKey) -> Result<()> {
        self.record(PageCall::PressKey(key));
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        self.record(PageCall::PageSource);
        self.with_active(|active| render_feed(&active.feed.entries[..active.loaded]))
    }

    async fn current_url(&self) -> Result<String> {
        self.with_active(|active| active.url.clone())
    }
}

fn render_feed(entries: &[ScriptedEntry]) -> String {
    let mut html = String::from(r#"<html><body><div role="feed">"#);
    for entry in entries {
        html.push_str(r#"<div class="Nv2PK">"#);
        html.push_str(&format!(r#"<div class="qBF1Pd">{}</div>"#, escape(&entry.name)));
        if let Some(website) = &entry.website {
            html.push_str(&format!(
                r#"<a data-item-id="authority" href="{}">Website</a>"#,
                escape(website)
            ));
        }
        if let Some(phone) = &entry.phone {
            html.push_str(&format!(r#"<span class="UsdlK">{}</span>"#, escape(phone)));
        }
        html.push_str("</div>");
    }
    html.push_str("</div></body></html>");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
