//! Tumblr backup CLI
//!
//! One-shot batch job: parses arguments, reads the API key, bootstraps the
//! output and cache directories, then hands resolved paths to the pipeline.

use std::path::PathBuf;

use clap::Parser;
use tumblr_backup::{
    config::{self, Config},
    error::Result,
    fetch::{PageCache, PageFetcher},
    pipeline,
    store::Store,
    utils::http,
};

/// Backup a Tumblr blog into SQLite and CSV.
#[derive(Parser, Debug)]
#[command(name = "tumblr-backup", version, about = "Backup tumblr blog")]
struct Cli {
    /// Tumblr blog name (without the .tumblr.com suffix)
    blog: String,

    /// Post offset to start from
    #[arg(short, long, default_value_t = 0)]
    offset: u64,

    /// Directory receiving the database, CSV log, and page cache
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Single-line file holding the API key
    #[arg(long, default_value = "config.txt")]
    key_file: PathBuf,

    /// Optional TOML file with fetch tunables
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point. Fatal errors surface here and exit non-zero.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let api_key = config::read_api_key(&cli.key_file)?;

    // Directory bootstrap happens once, up front; the core components only
    // ever see resolved paths.
    let cache_dir = cli.output_dir.join("cache");
    std::fs::create_dir_all(&cache_dir)?;

    log::info!("backing up blog '{}' from offset {}", cli.blog, cli.offset);

    let store = Store::open(&cli.output_dir, &cli.blog)?;

    let client = http::create_client(&config.fetch)?;
    let mut fetcher = PageFetcher::new(
        client,
        &config.fetch,
        &cli.blog,
        api_key,
        PageCache::new(cache_dir),
    )?;

    let stats = pipeline::run_backup(
        &mut fetcher,
        store,
        cli.offset,
        config.fetch.page_size,
    )
    .await?;

    log::info!(
        "done: {} posts saved to {}",
        stats.posts,
        cli.output_dir.join(format!("{}.db", cli.blog)).display()
    );

    Ok(())
}
