// src/store/mod.rs

//! Dual-sink persistence for normalized records.
//!
//! Every record is written to both a SQLite database (nine typed tables
//! plus a union view) and a flat CSV log; the two stay row-for-row
//! consistent. Opening a store rotates any pre-existing files aside with a
//! `.bak` suffix. The tool never updates records in place — each run
//! produces a fresh store.

pub mod csv;
pub mod sqlite;

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::PostRecord;

pub use csv::CsvSink;
pub use sqlite::SqliteSink;

/// The combined relational and flat sinks for one blog.
pub struct Store {
    db: SqliteSink,
    log: CsvSink,
}

impl Store {
    /// Open a fresh store for `blog` under `dir`.
    ///
    /// Existing `{blog}.db` / `{blog}.csv` files are renamed with a `.bak`
    /// suffix first. Rotation failure is logged and the run proceeds;
    /// creation failure afterwards is fatal.
    pub fn open(dir: &Path, blog: &str) -> Result<Self> {
        let db_path = dir.join(format!("{blog}.db"));
        let csv_path = dir.join(format!("{blog}.csv"));

        rotate(&db_path);
        rotate(&csv_path);

        let db = SqliteSink::open(&db_path)?;
        let log = CsvSink::open(&csv_path)?;
        log::info!("created new store {:?}", db_path);

        Ok(Self { db, log })
    }

    /// Write one record to both sinks.
    pub fn write(&mut self, record: &PostRecord) -> Result<()> {
        log::info!("{} - #{}", record.post_type(), record.id);
        self.db.insert(record)?;
        self.log.append(record)?;
        Ok(())
    }

    /// Flush and close both sinks. Call exactly once, at normal
    /// termination; aborting earlier discards everything since open.
    pub fn commit(self) -> Result<()> {
        self.db.commit()?;
        self.log.finish()?;
        Ok(())
    }
}

/// Best-effort rotation: rename an existing store file to `{name}.bak`.
/// Failure is not fatal here — creating the fresh store may still succeed
/// (or fail on its own and abort the run).
fn rotate(path: &Path) {
    if !path.exists() {
        return;
    }

    let mut bak = path.as_os_str().to_os_string();
    bak.push(".bak");

    match fs::rename(path, &bak) {
        Ok(()) => log::info!("backed up existing {:?} to {:?}", path, bak),
        Err(e) => log::warn!("can't back up {:?}: {e}", path),
    }
}
