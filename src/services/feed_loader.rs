use crate::{configuration::ScraperSettings, error::Result};

use super::{MapsPage, ScrollKey};

/// How a feed stopped loading. Both are normal returns: `Stalled` means the
/// attempt ceiling was hit before the end-of-list marker showed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    Exhausted { loaded: usize },
    Stalled { loaded: usize },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub iterations: u32,
    pub nudges: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReport {
    pub outcome: FeedOutcome,
    pub stats: FeedStats,
}

/// Counters for one feed. Created fresh for every query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedState {
    pub loaded_count: usize,
    pub no_progress_streak: u32,
    pub total_attempts: u32,
}

impl FeedState {
    /// Records a fresh entry count. Returns `true` if the feed grew.
    pub fn observe(&mut self, count: usize) -> bool {
        match count > self.loaded_count {
            true => {
                self.loaded_count = count;
                self.total_attempts = 0;
                self.no_progress_streak = 0;
                true
            }
            false => {
                self.total_attempts += 1;
                self.no_progress_streak += 1;
                false
            }
        }
    }

    pub fn is_stuck(&self, stall_threshold: u32) -> bool {
        self.no_progress_streak > stall_threshold
    }

    pub fn out_of_attempts(&self, max_attempts: u32) -> bool {
        self.total_attempts >= max_attempts
    }
}

/// Scrolls the open result feed until the end-of-list marker appears or
/// `max_scroll_attempts` reads in a row bring no new entries.
pub async fn load_feed<P>(page: &P, settings: &ScraperSettings) -> Result<FeedReport>
where
    P: MapsPage + ?Sized,
{
    log::info!("Starting to scroll to bottom...");
    let mut state = FeedState::default();
    let mut stats = FeedStats::default();

    while !state.out_of_attempts(settings.max_scroll_attempts) {
        stats.iterations += 1;

        let count = page.count_elements(&settings.entry_selector).await?;
        if state.observe(count) {
            log::info!("Scrolled to {} results", count);
        }

        page.scroll_to_end(&settings.feed_selector).await?;
        page.press_key(ScrollKey::PageDown).await?;

        wait_for_loading_indicator(page, settings).await;

        if reached_end_of_list(page, settings).await? {
            log::info!("Reached end of list message");
            return Ok(FeedReport {
                outcome: FeedOutcome::Exhausted {
                    loaded: state.loaded_count,
                },
                stats,
            });
        }

        if state.is_stuck(settings.stall_threshold) {
            log::info!("Seems stuck, trying to nudge...");
            nudge(page, settings).await?;
            state.no_progress_streak = 0;
            stats.nudges += 1;
        }

        tokio::time::sleep(settings.scroll_pacing()).await;
    }

    log::warn!(
        "Gave up after {} scroll attempts without new results ({} loaded)",
        settings.max_scroll_attempts,
        state.loaded_count
    );

    Ok(FeedReport {
        outcome: FeedOutcome::Stalled {
            loaded: state.loaded_count,
        },
        stats,
    })
}

// An indicator that never shows, or never clears, only means no fetch was
// triggered this round.
async fn wait_for_loading_indicator<P>(page: &P, settings: &ScraperSettings)
where
    P: MapsPage + ?Sized,
{
    if page
        .wait_for_element(&settings.loading_selector, settings.indicator_appear_timeout())
        .await
        .is_err()
    {
        return;
    }

    if let Err(e) = page
        .wait_for_element_hidden(&settings.loading_selector, settings.indicator_hide_timeout())
        .await
    {
        log::debug!("Loading indicator still visible: {}", e);
    }
}

async fn reached_end_of_list<P>(page: &P, settings: &ScraperSettings) -> Result<bool>
where
    P: MapsPage + ?Sized,
{
    let message = page.element_text(&settings.end_marker_selector).await?;
    Ok(message.is_some_and(|text| text.contains(&settings.end_marker_phrase)))
}

async fn nudge<P>(page: &P, settings: &ScraperSettings) -> Result<()>
where
    P: MapsPage + ?Sized,
{
    page.scroll_window_by(-settings.nudge_offset_px).await?;
    tokio::time::sleep(settings.nudge_settle()).await;
    page.scroll_window_by(settings.nudge_offset_px).await?;
    page.press_key(ScrollKey::ArrowDown).await
}
