//! Tracing output for a process whose terminal belongs to the UI.
//!
//! Events only go somewhere when a log file is configured. The filter comes
//! from `POKEDEX_LOG`, then `RUST_LOG`, then defaults to `pokedex_ko=info`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "POKEDEX_LOG";
const DEFAULT_DIRECTIVES: &str = "pokedex_ko=info,warn";

/// Install the global subscriber writing to `path`, if one was given.
pub fn init(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(layer)
        .try_init()
        .map_err(io::Error::other)?;
    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}

fn env_filter() -> EnvFilter {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}
