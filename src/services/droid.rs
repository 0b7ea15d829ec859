use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thirtyfour::{prelude::*, ChromiumLikeCapabilities};

use crate::{
    configuration::BrowserSettings,
    error::{Result, ScrapeError},
};

use super::{MapsPage, ScrollKey};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const SCROLL_TO_END: &str = r#"
    const feed = document.querySelector(arguments[0]);
    if (feed) {
        feed.scrollTop = feed.scrollHeight;
    }
"#;

const SCROLL_WINDOW_BY: &str = "window.scrollBy(0, arguments[0]);";

// textContent includes text that is hidden or not yet laid out.
const TEXT_CONTENT: &str = r#"
    const el = document.querySelector(arguments[0]);
    return el ? el.textContent : null;
"#;

/// A Chrome session behind a WebDriver endpoint, with one tab.
pub struct Droid {
    pub driver: WebDriver,
}

impl Droid {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();

        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            format!("--lang={}", settings.language),
            format!(
                "--window-size={},{}",
                settings.window_width, settings.window_height
            ),
        ];
        if settings.headless {
            args.push("--headless=new".to_string());
        }
        if settings.random_user_agent {
            let user_agent = fake_user_agent::get_chrome_rua();
            log::info!("Using user agent: {}", user_agent);
            args.push(format!("--user-agent={}", user_agent));
        }

        for arg in args.iter() {
            caps.add_arg(arg).map_err(ScrapeError::SessionLaunch)?;
        }

        let driver = WebDriver::new(settings.webdriver_url.as_str(), caps)
            .await
            .map_err(ScrapeError::SessionLaunch)?;

        Ok(Droid { driver })
    }

    pub async fn close(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl MapsPage for Droid {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.driver.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: format!("page did not load within {:?}", timeout),
            }),
        }
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map(|_| ())
            .map_err(|_| ScrapeError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            })
    }

    async fn wait_for_element_hidden(&self, selector: &str, timeout: Duration) -> Result<()> {
        let hidden = self
            .driver
            .query(By::Css(selector))
            .and_displayed()
            .wait(timeout, POLL_INTERVAL)
            .not_exists()
            .await?;

        match hidden {
            true => Ok(()),
            false => Err(ScrapeError::Timeout {
                selector: selector.to_string(),
                waited: timeout,
            }),
        }
    }

    async fn count_elements(&self, selector: &str) -> Result<usize> {
        Ok(self.driver.find_all(By::Css(selector)).await?.len())
    }

    async fn element_text(&self, selector: &str) -> Result<Option<String>> {
        let ret = self
            .driver
            .execute(TEXT_CONTENT, vec![json!(selector)])
            .await?;
        text_content(ret.json())
    }

    async fn scroll_to_end(&self, selector: &str) -> Result<()> {
        self.driver
            .execute(SCROLL_TO_END, vec![json!(selector)])
            .await?;
        Ok(())
    }

    async fn scroll_window_by(&self, dy: i64) -> Result<()> {
        self.driver
            .execute(SCROLL_WINDOW_BY, vec![json!(dy)])
            .await?;
        Ok(())
    }

    async fn press_key(&self, key: ScrollKey) -> Result<()> {
        let key = match key {
            ScrollKey::PageDown => Key::PageDown,
            ScrollKey::ArrowDown => Key::Down,
        };
        self.driver.active_element().await?.send_keys(key).await?;
        Ok(())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.driver.source().await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }
}

/// Anything other than a string or `null` means the script misbehaved.
fn text_content(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.clone())),
        other => Err(ScrapeError::Script(format!(
            "expected text content, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::text_content;

    #[test]
    fn missing_element_has_no_text() {
        assert_eq!(text_content(&json!(null)).unwrap(), None);
    }

    #[test]
    fn keeps_text_content_verbatim() {
        let raw = "\n  You've reached the end of the list.  ";

        assert_eq!(
            text_content(&json!(raw)).unwrap().as_deref(),
            Some(raw)
        );
    }

    #[test]
    fn non_string_result_is_a_script_error() {
        assert!(text_content(&json!({ "text": "x" })).is_err());
    }
}
