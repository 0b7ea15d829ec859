use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::{
    configuration::{ScraperSettings, SearchSettings},
    domain::{BusinessRecord, Query, ResultSet},
    error::Result,
};

use super::{MapsPage, MapsScraper};

#[derive(Debug)]
pub struct HarvestReport {
    /// Unique records in the order they were first found.
    pub records: Vec<BusinessRecord>,
    pub duplicate_count: usize,
    pub queries_attempted: usize,
    pub queries_failed: usize,
    pub elapsed: Duration,
}

impl HarvestReport {
    pub fn with_website(&self) -> usize {
        self.records.iter().filter(|r| r.website.is_some()).count()
    }

    pub fn without_website(&self) -> usize {
        self.records.len() - self.with_website()
    }
}

/// Every region paired with every keyword, regions outermost. Repeated
/// regions are kept, so they are searched again.
pub fn build_queries(regions: &[String], keywords: &[String]) -> Vec<Query> {
    regions
        .iter()
        .cartesian_product(keywords.iter())
        .map(|(region, keyword)| Query::new(keyword.as_str(), region.as_str()))
        .collect()
}

/// Searches the whole region × keyword matrix on `page`, one query at a time.
///
/// A failing query is logged and contributes nothing; the run always moves
/// on to the next one. The query delay is applied after every query.
pub async fn harvest<P>(
    page: &P,
    search: &SearchSettings,
    settings: &ScraperSettings,
) -> Result<HarvestReport>
where
    P: MapsPage + ?Sized,
{
    harvest_since(Instant::now(), page, search, settings).await
}

/// Like [`harvest`], but the reported `elapsed` is measured from `start`.
pub async fn harvest_since<P>(
    start: Instant,
    page: &P,
    search: &SearchSettings,
    settings: &ScraperSettings,
) -> Result<HarvestReport>
where
    P: MapsPage + ?Sized,
{
    let scraper = MapsScraper::new(page, search, settings)?;
    let queries = build_queries(&search.regions, &search.keywords);

    log::info!("Running {} searches", queries.len());

    let mut results = ResultSet::new();
    let mut queries_failed = 0;

    for query in queries.iter() {
        match scraper.scrape(query).await {
            Ok(businesses) => {
                let found = businesses.len();
                let stats = results.merge(businesses);
                log::info!(
                    "Found {} businesses for \"{}\" ({} new, {} duplicates)",
                    found,
                    query,
                    stats.added,
                    stats.duplicates
                );
            }
            Err(e) => {
                queries_failed += 1;
                log::error!(
                    "Error processing {} in {}: {}",
                    query.keyword,
                    query.region,
                    e
                );
            }
        }

        tokio::time::sleep(settings.query_delay()).await;
    }

    log::info!("All searches completed");

    Ok(HarvestReport {
        duplicate_count: results.duplicate_count(),
        records: results.into_records(),
        queries_attempted: queries.len(),
        queries_failed,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{build_queries, harvest, harvest_since};
    use crate::{
        configuration::{ScraperSettings, SearchSettings},
        domain::Query,
        testing::{ScriptedFeed, ScriptedPage},
    };

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn search(regions: &[&str], keywords: &[&str]) -> SearchSettings {
        SearchSettings {
            base_url: "https://maps.test/search/".to_string(),
            viewport: "@54.5,-4,6z".to_string(),
            hl: "en".to_string(),
            gl: "uk".to_string(),
            regions: strings(regions),
            keywords: strings(keywords),
        }
    }

    #[test]
    fn queries_run_regions_outer_keywords_inner() {
        let queries = build_queries(
            &strings(&["Leeds", "York", "Leeds"]),
            &strings(&["letting agents", "estate management"]),
        );

        assert_eq!(
            queries,
            vec![
                Query::new("letting agents", "Leeds"),
                Query::new("estate management", "Leeds"),
                Query::new("letting agents", "York"),
                Query::new("estate management", "York"),
                Query::new("letting agents", "Leeds"),
                Query::new("estate management", "Leeds"),
            ]
        );
    }

    #[test]
    fn no_keywords_means_no_queries() {
        assert!(build_queries(&strings(&["Leeds"]), &[]).is_empty());
    }

    #[tokio::test]
    async fn failed_query_does_not_stop_the_run() {
        let page = ScriptedPage::new()
            .failing_navigation("a%20Aville")
            .with_feed("b%20Aville", ScriptedFeed::new(&["B1"]).with_end_marker_after(1))
            .with_feed("c%20Aville", ScriptedFeed::new(&["C1", "C2"]).with_end_marker_after(1));

        let report = harvest(
            &page,
            &search(&["Aville"], &["a", "b", "c"]),
            &ScraperSettings::without_delays(),
        )
        .await
        .unwrap();

        assert_eq!(page.navigations().len(), 3);
        assert_eq!(report.queries_attempted, 3);
        assert_eq!(report.queries_failed, 1);
        let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B1", "C1", "C2"]);
    }

    #[tokio::test]
    async fn repeated_region_is_searched_again_and_deduplicated() {
        let page = ScriptedPage::new().with_feed(
            "widgets%20Aville",
            ScriptedFeed::new(&["A", "B"]).with_end_marker_after(1),
        );

        let report = harvest(
            &page,
            &search(&["Aville", "Aville"], &["widgets"]),
            &ScraperSettings::without_delays(),
        )
        .await
        .unwrap();

        assert_eq!(page.navigations().len(), 2);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.duplicate_count, 2);
    }

    #[tokio::test]
    async fn same_name_in_other_region_is_kept() {
        let page = ScriptedPage::new()
            .with_feed(
                "widgets%20Aville",
                ScriptedFeed::new(&["A"]).with_end_marker_after(1),
            )
            .with_feed(
                "widgets%20Btown",
                ScriptedFeed::new(&["A"]).with_end_marker_after(1),
            );

        let report = harvest(
            &page,
            &search(&["Aville", "Btown"], &["widgets"]),
            &ScraperSettings::without_delays(),
        )
        .await
        .unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.duplicate_count, 0);
        assert_eq!(report.records[1].region, "Btown");
    }

    #[tokio::test]
    async fn elapsed_counts_from_the_given_start() {
        let page = ScriptedPage::new().with_feed(
            "widgets%20Aville",
            ScriptedFeed::new(&["A"]).with_end_marker_after(1),
        );
        let start = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .unwrap();

        let report = harvest_since(
            start,
            &page,
            &search(&["Aville"], &["widgets"]),
            &ScraperSettings::without_delays(),
        )
        .await
        .unwrap();

        assert!(report.elapsed >= Duration::from_secs(5));
    }
}
