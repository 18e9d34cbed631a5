//! vcache - run cache commands against a tiered value cache

mod config;
mod handler;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CacheConfig, StoreSpec};
use crate::handler::CommandHandler;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Cache capacity (number of items)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Backing store in chain order, `memory` or `file:<path>` (repeatable)
    #[arg(short, long = "store")]
    stores: Vec<StoreSpec>,

    /// Read commands from a script file instead of stdin
    #[arg(short = 'i', long)]
    script: Option<PathBuf>,
}

impl Args {
    fn cache_config(&self) -> Result<CacheConfig> {
        let mut config = match &self.config {
            Some(path) => CacheConfig::load(path)?,
            None => CacheConfig::default(),
        };
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if !self.stores.is_empty() {
            config.stores = self.stores.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only replies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.cache_config()?;

    info!("Starting vcache v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", config.capacity);

    let cache = Arc::new(config.build()?);
    let handler = CommandHandler::new(Arc::clone(&cache));

    let stdout = io::stdout();
    match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            run(&handler, BufReader::new(file), stdout.lock())?;
        }
        None => run(&handler, io::stdin().lock(), stdout.lock())?,
    }

    info!("Final stats: {}", cache.stats().snapshot());
    Ok(())
}

/// Execute every line of `input`, writing one reply per command
fn run<R: BufRead, W: Write>(handler: &CommandHandler, input: R, mut output: W) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if let Some(reply) = handler.handle_line(&line) {
            writeln!(output, "{}", reply)?;
        }
    }
    output.flush()?;
    Ok(())
}
