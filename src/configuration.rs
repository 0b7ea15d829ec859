use std::time::Duration;

use serde::Deserialize;
use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub browser: BrowserSettings,
    pub search: SearchSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub output_dir: String,
    pub file_prefix: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub headless: bool,
    pub language: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_height: u32,
    #[serde(deserialize_with = "deserialize_bool_from_anything")]
    pub random_user_agent: bool,
}

/// Where searches are sent and which region/keyword pairs are searched.
///
/// Both lists are used exactly as given: order is preserved and repeated
/// entries are searched again.
#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    pub base_url: String,
    pub viewport: String,
    pub hl: String,
    pub gl: String,
    pub regions: Vec<String>,
    pub keywords: Vec<String>,
}

/// Selectors, limits and timings for loading and reading the result feed.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ScraperSettings {
    pub feed_selector: String,
    pub entry_selector: String,
    pub loading_selector: String,
    pub end_marker_selector: String,
    pub end_marker_phrase: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_scroll_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub stall_threshold: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub nudge_offset_px: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub nudge_settle_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub indicator_appear_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub indicator_hide_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub scroll_pacing_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub navigation_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub feed_timeout_ms: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub query_delay_ms: u64,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        ScraperSettings {
            feed_selector: r#"div[role="feed"]"#.to_string(),
            entry_selector: "div.Nv2PK".to_string(),
            loading_selector: ".wo1ice-loading".to_string(),
            end_marker_selector: ".PbZDve".to_string(),
            end_marker_phrase: "You've reached the end of the list".to_string(),
            max_scroll_attempts: 50,
            stall_threshold: 5,
            nudge_offset_px: 100,
            nudge_settle_ms: 100,
            indicator_appear_timeout_ms: 2_000,
            indicator_hide_timeout_ms: 10_000,
            scroll_pacing_ms: 1_000,
            navigation_timeout_ms: 60_000,
            feed_timeout_ms: 60_000,
            query_delay_ms: 5_000,
        }
    }
}

impl ScraperSettings {
    /// Same selectors and limits, with every wait and delay set to zero.
    pub fn without_delays() -> Self {
        ScraperSettings {
            nudge_settle_ms: 0,
            indicator_appear_timeout_ms: 0,
            indicator_hide_timeout_ms: 0,
            scroll_pacing_ms: 0,
            query_delay_ms: 0,
            ..Default::default()
        }
    }

    pub fn nudge_settle(&self) -> Duration {
        Duration::from_millis(self.nudge_settle_ms)
    }

    pub fn indicator_appear_timeout(&self) -> Duration {
        Duration::from_millis(self.indicator_appear_timeout_ms)
    }

    pub fn indicator_hide_timeout(&self) -> Duration {
        Duration::from_millis(self.indicator_hide_timeout_ms)
    }

    pub fn scroll_pacing(&self) -> Duration {
        Duration::from_millis(self.scroll_pacing_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_timeout_ms)
    }

    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // APP_BROWSER__HEADLESS=true sets browser.headless
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{Environment, Settings};

    fn load_base() -> Settings {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configuration/base.yaml");
        config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap()
    }

    #[test]
    fn base_configuration_matches_defaults() {
        let settings = load_base();

        assert_eq!(settings.scraper.max_scroll_attempts, 50);
        assert_eq!(settings.scraper.stall_threshold, 5);
        assert_eq!(settings.scraper.entry_selector, "div.Nv2PK");
        assert_eq!(settings.scraper.feed_selector, r#"div[role="feed"]"#);
        assert_eq!(settings.scraper.query_delay_ms, 5_000);
        assert_eq!(settings.application.file_prefix, "property_management_companies");
    }

    #[test]
    fn base_configuration_keeps_duplicate_regions() {
        let settings = load_base();

        assert_eq!(settings.search.regions.len(), 89);
        assert_eq!(settings.search.keywords.len(), 4);
        for city in ["Bristol", "Belfast", "Wolverhampton", "Basingstoke"] {
            let count = settings.search.regions.iter().filter(|r| *r == city).count();
            assert_eq!(count, 2, "{} should be listed twice", city);
        }
    }

    #[test]
    fn environment_parsing() {
        assert!(matches!(
            Environment::try_from("Production".to_string()),
            Ok(Environment::Production)
        ));
        assert!(matches!(
            Environment::try_from("local".to_string()),
            Ok(Environment::Local)
        ));
        assert!(Environment::try_from("staging".to_string()).is_err());
    }
}
