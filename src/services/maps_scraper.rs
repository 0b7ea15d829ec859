use url::{ParseError, Url};

use crate::{
    configuration::{ScraperSettings, SearchSettings},
    domain::{BusinessRecord, ListingExtractor, Query},
    error::{Result, ScrapeError},
};

use super::{load_feed, FeedOutcome, MapsPage};

const MAP_DATA_SEGMENT: &str = "data=!3m1!4b1";

/// `<base>/<keyword region>/<viewport>/data=!3m1!4b1?entry=ttu&hl=..&gl=..`
pub fn search_url(search: &SearchSettings, query: &Query) -> Result<Url> {
    let mut url = Url::parse(&search.base_url)?;

    url.path_segments_mut()
        .map_err(|_| ScrapeError::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(&query.search_text())
        .push(&search.viewport)
        .push(MAP_DATA_SEGMENT);

    url.query_pairs_mut()
        .append_pair("entry", "ttu")
        .append_pair("hl", &search.hl)
        .append_pair("gl", &search.gl);

    Ok(url)
}

/// Runs single searches against one page: open, load the whole feed, read it.
pub struct MapsScraper<'a, P: ?Sized> {
    page: &'a P,
    extractor: ListingExtractor,
    search: &'a SearchSettings,
    settings: &'a ScraperSettings,
}

impl<'a, P> MapsScraper<'a, P>
where
    P: MapsPage + ?Sized,
{
    pub fn new(
        page: &'a P,
        search: &'a SearchSettings,
        settings: &'a ScraperSettings,
    ) -> Result<Self> {
        Ok(MapsScraper {
            page,
            extractor: ListingExtractor::new(&settings.entry_selector)?,
            search,
            settings,
        })
    }

    pub async fn scrape(&self, query: &Query) -> Result<Vec<BusinessRecord>> {
        let url = search_url(self.search, query)?;
        log::info!("Searching for: {}", query);

        self.page
            .navigate(url.as_str(), self.settings.navigation_timeout())
            .await?;

        log::info!("Waiting for results to load...");
        self.page
            .wait_for_element(&self.settings.feed_selector, self.settings.feed_timeout())
            .await?;
        log::info!("Results loaded");

        let report = load_feed(self.page, self.settings).await?;
        match report.outcome {
            FeedOutcome::Exhausted { loaded } => {
                log::info!("Scrolling completed with {} results", loaded)
            }
            FeedOutcome::Stalled { loaded } => log::warn!(
                "Scrolling stopped before the end of the list with {} results",
                loaded
            ),
        }

        let page_source = self.page.page_source().await?;
        let page_url = Url::parse(&self.page.current_url().await?)?;

        Ok(self
            .extractor
            .extract_businesses(&page_source, &page_url, &query.region))
    }
}
