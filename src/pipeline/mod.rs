// src/pipeline/mod.rs

//! Pipeline entry point: the pagination driver.
//!
//! A single sequential loop: fetch the page at the cursor, normalize and
//! write every post, advance by the page size, stop at the first empty
//! page. Any error during fetch or write propagates immediately and the
//! store is never committed — work since open is lost by design.

use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::normalize::normalize;
use crate::store::Store;

/// Counters reported after a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BackupStats {
    /// Pages fetched, including the terminal empty one
    pub pages: u64,

    /// Records written to both sinks
    pub posts: u64,
}

/// Run the backup loop from `start_offset` until the first empty page,
/// then commit the store.
pub async fn run_backup(
    fetcher: &mut PageFetcher,
    mut store: Store,
    start_offset: u64,
    page_size: u64,
) -> Result<BackupStats> {
    let mut stats = BackupStats::default();
    let mut offset = start_offset;

    loop {
        let page = fetcher.get(offset).await?;
        stats.pages += 1;

        if page.is_empty() {
            store.commit()?;
            log::info!(
                "finished: {} posts over {} pages",
                stats.posts,
                stats.pages
            );
            return Ok(stats);
        }

        for post in &page.posts {
            let record = normalize(post)?;
            store.write(&record)?;
            stats.posts += 1;
        }

        offset += page_size;
        log::info!("offset {offset}");
    }
}
