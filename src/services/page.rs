use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    PageDown,
    ArrowDown,
}

/// The single browser tab a run drives.
///
/// Calls are made one at a time; each one is a suspension point against the
/// live page and nothing else touches the page while it is in flight.
#[async_trait]
pub trait MapsPage: Send + Sync {
    /// Loads `url`, failing with `ScrapeError::Navigation` if it does not
    /// finish within `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Waits until an element matching `selector` is present.
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Waits until no visible element matches `selector`.
    async fn wait_for_element_hidden(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn count_elements(&self, selector: &str) -> Result<usize>;

    /// Text of the first match, or `None` when nothing matches.
    async fn element_text(&self, selector: &str) -> Result<Option<String>>;

    /// Scrolls the first element matching `selector` to its full height.
    async fn scroll_to_end(&self, selector: &str) -> Result<()>;

    async fn scroll_window_by(&self, dy: i64) -> Result<()>;

    async fn press_key(&self, key: ScrollKey) -> Result<()>;

    async fn page_source(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;
}
