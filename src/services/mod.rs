pub mod data_persistance;
pub mod droid;
pub mod feed_loader;
pub mod maps_scraper;
pub mod orchestrator;
pub mod page;

pub use data_persistance::*;
pub use droid::*;
pub use feed_loader::*;
pub use maps_scraper::*;
pub use orchestrator::*;
pub use page::*;
