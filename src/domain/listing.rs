use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{domain::BusinessRecord, error::ScrapeError};

const NAME_SELECTOR: &str = "div.qBF1Pd";
const PHONE_SELECTOR: &str = "span.UsdlK";

/// Website link strategies, most specific first. The first selector that
/// matches anything decides the link; later ones are not consulted.
pub const WEBSITE_SELECTORS: [&str; 4] = [
    r#"a.lcr4fd[data-value="Website"]"#,
    r#"a[data-item-id="authority"]"#,
    r#"a[data-tooltip="Open website"]"#,
    r#"a[href^="http"]:not([href^="https://www.google.com"])"#,
];

/// Read access to one rendered result entry.
pub trait RenderedEntry {
    fn has(&self, selector: &Selector) -> bool;

    fn text_of(&self, selector: &Selector) -> Option<String>;

    fn attr_of(&self, selector: &Selector, name: &str) -> Option<String>;
}

impl RenderedEntry for ElementRef<'_> {
    fn has(&self, selector: &Selector) -> bool {
        self.select(selector).next().is_some()
    }

    fn text_of(&self, selector: &Selector) -> Option<String> {
        self.select(selector)
            .next()
            .map(|element| element.text().collect::<String>())
    }

    fn attr_of(&self, selector: &Selector, name: &str) -> Option<String> {
        self.select(selector)
            .next()
            .and_then(|element| element.value().attr(name))
            .map(|value| value.to_string())
    }
}

pub struct ListingExtractor {
    entry: Selector,
    name: Selector,
    phone: Selector,
    website: Vec<Selector>,
}

impl ListingExtractor {
    pub fn new(entry_selector: &str) -> Result<Self, ScrapeError> {
        Ok(ListingExtractor {
            entry: parse_selector(entry_selector)?,
            name: parse_selector(NAME_SELECTOR)?,
            phone: parse_selector(PHONE_SELECTOR)?,
            website: WEBSITE_SELECTORS
                .iter()
                .map(|st| parse_selector(st))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Reads every entry currently in `page_source`. Entries without a name
    /// are dropped; every record gets the same `region`.
    pub fn extract_businesses(
        &self,
        page_source: &str,
        page_url: &Url,
        region: &str,
    ) -> Vec<BusinessRecord> {
        let document = Html::parse_document(page_source);

        document
            .select(&self.entry)
            .filter_map(|entry| self.extract_record(&entry, page_url, region))
            .collect()
    }

    pub fn extract_record(
        &self,
        entry: &impl RenderedEntry,
        page_url: &Url,
        region: &str,
    ) -> Option<BusinessRecord> {
        let name = non_empty(entry.text_of(&self.name)?)?;

        let website = self
            .website
            .iter()
            .find(|st| entry.has(st))
            .and_then(|st| entry.attr_of(st, "href"))
            .map(|href| absolute_url(page_url, href));

        let phone = entry.text_of(&self.phone).and_then(non_empty);

        Some(BusinessRecord {
            name,
            website,
            phone,
            region: region.to_string(),
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|_| ScrapeError::Selector(selector.to_string()))
}

fn non_empty(text: String) -> Option<String> {
    let text = text.trim();
    match text.is_empty() {
        true => None,
        false => Some(text.to_string()),
    }
}

// Relative hrefs resolve the way the browser's `href` property would.
fn absolute_url(page_url: &Url, href: String) -> String {
    match page_url.join(&href) {
        Ok(url) => url.to_string(),
        Err(_) => href,
    }
}
