use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use thirtyfour::error::WebDriverError;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out after {waited:?} waiting for `{selector}`")]
    Timeout { selector: String, waited: Duration },

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Invalid selector `{0}`")]
    Selector(String),

    #[error("Invalid search url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Could not launch browser session: {0}")]
    SessionLaunch(#[source] WebDriverError),

    #[error("Could not write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    WebDriver(#[from] WebDriverError),
}
