use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::{
    configuration::{ApplicationSettings, Settings},
    services::{
        csv_file_name, harvest_since, log_business_listing, write_csv, Droid, HarvestReport,
    },
};

/// One full batch run: launch the browser, search every query, close the
/// browser, then report and write the CSV.
///
/// Only a failed launch ends the run early. The browser is closed whether
/// or not the searches succeed.
pub async fn run(configuration: Settings) -> anyhow::Result<HarvestReport> {
    log::info!("Launching browser...");
    let started = Instant::now();
    let droid = Droid::launch(&configuration.browser)
        .await
        .context("Failed to launch browser session")?;
    log::info!("Browser launched successfully");

    let outcome = harvest_since(
        started,
        &droid,
        &configuration.search,
        &configuration.scraper,
    )
    .await;

    log::info!("Closing browser...");
    match droid.close().await {
        Ok(()) => log::info!("Browser closed"),
        Err(e) => log::error!("Failed to close browser: {}", e),
    }

    let report = outcome.context("Search run aborted")?;

    log_summary(&report);
    log_business_listing(&report.records);
    export(&configuration.application, &report).await;

    Ok(report)
}

pub fn log_summary(report: &HarvestReport) {
    log::info!("Total unique businesses found: {}", report.records.len());
    log::info!("Total duplicates found: {}", report.duplicate_count);
    log::info!(
        "Searches failed: {} of {}",
        report.queries_failed,
        report.queries_attempted
    );
    log::info!("Businesses with websites: {}", report.with_website());
    log::info!("Businesses without websites: {}", report.without_website());
    log::info!("Total time in seconds: {}", report.elapsed.as_secs());
}

// A failed write leaves the listing above as the only copy of the results.
async fn export(application: &ApplicationSettings, report: &HarvestReport) {
    let file_name = csv_file_name(
        &application.file_prefix,
        chrono::Utc::now().date_naive(),
    );

    match write_csv(Path::new(&application.output_dir), &file_name, &report.records).await {
        Ok(path) => log::info!("CSV file '{}' has been created successfully.", path.display()),
        Err(e) => log::error!("Error writing CSV file: {}", e),
    }
}
