//! Modsync CLI - refresh the mod metadata caches from the command line.
//!
//! Loads every backend cache, refreshes the enabled backends for the given
//! mods list, then writes back whatever changed.

mod mods_file;

use anyhow::Result;
use clap::Parser;
use modsync_core::{CacheRegistry, CancellationToken, ModSource, SyncSettings};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "modsync")]
#[command(about = "Refresh cached mod metadata from GitHub, Steam Workshop and Nexus Mods")]
struct Args {
    /// Settings file (JSON); defaults are used when it does not exist
    #[arg(long, default_value = "modsync.json")]
    settings: PathBuf,

    /// Override the cache directory from the settings file
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Mods list (JSON array of mod descriptors)
    #[arg(long)]
    mods: PathBuf,

    /// Skip a backend for this run (github, workshop, nexus)
    #[arg(long = "disable", value_name = "SRC")]
    disabled: Vec<ModSource>,

    /// Rewrite the mods file with the refreshed metadata
    #[arg(long)]
    write_back: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let mut settings = SyncSettings::load_or_default(&args.settings)?;
    if let Some(dir) = args.cache_dir {
        settings.cache_dir = Some(dir);
    }

    let mut mods = mods_file::load_mods(&args.mods)?;
    info!("Loaded {} mod(s) from {}", mods.len(), args.mods.display());

    let mut registry = CacheRegistry::with_clients(&settings)?;
    for source in &args.disabled {
        registry.set_enabled(*source, false);
    }
    registry.load_all();

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after in-flight requests");
            signal_token.cancel();
        }
    });

    let outcomes = registry.refresh_all(&mut mods, &cancel).await;
    let written = registry.persist_dirty();

    for source in ModSource::ALL {
        let status = match outcomes.get(&source) {
            Some(true) => "updated",
            Some(false) => "no updates",
            None => "disabled",
        };
        let persisted = if written.contains(&source) { ", cache written" } else { "" };
        println!("{}: {}{}", source, status, persisted);
    }
    for line in mods_file::update_lines(&mods) {
        println!("{}", line);
    }

    if args.write_back {
        mods_file::write_mods(&args.mods, &mods)?;
        info!("Wrote refreshed metadata to {}", args.mods.display());
    }

    if cancel.is_cancelled() {
        warn!("Refresh was cancelled; partial results were kept");
    }

    Ok(())
}
