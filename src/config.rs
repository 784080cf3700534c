//! Runtime configuration: CLI flags with environment fallbacks.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_LANGUAGE: &str = "ko";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SCROLL_THRESHOLD: usize = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    EmptyPage,
    #[error("page size {0} exceeds the maximum of {MAX_PAGE_SIZE}")]
    PageTooLarge(u32),
    #[error("timeout must be at least 1 second")]
    ZeroTimeout,
    #[error("language code must not be empty")]
    EmptyLanguage,
    #[error("api base must be an http(s) url, got `{0}`")]
    InvalidApiBase(String),
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Base URL of the PokeAPI-compatible service
    #[arg(long, env = "POKEDEX_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Language code used for localized names
    #[arg(long, env = "POKEDEX_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Items fetched per page
    #[arg(long, env = "POKEDEX_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Quiet period before a search query is applied
    #[arg(long, env = "POKEDEX_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    pub debounce_ms: u64,

    /// Rows from the bottom of the list at which the next page is requested
    #[arg(long, env = "POKEDEX_SCROLL_THRESHOLD", default_value_t = DEFAULT_SCROLL_THRESHOLD)]
    pub scroll_threshold: usize,

    /// Deadline for a single page or detail load
    #[arg(long, env = "POKEDEX_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Write tracing output to this file (the terminal belongs to the UI)
    #[arg(long, env = "POKEDEX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub language: String,
    pub timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub settings: Settings,
}

/// The part of the configuration the reducer needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub page_size: u32,
    pub debounce_ms: u64,
    pub scroll_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: None,
            settings: Settings::default(),
        }
    }
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let config = Self {
            api_base: args.api_base.trim_end_matches('/').to_string(),
            language: args.language.trim().to_string(),
            timeout: Duration::from_secs(args.timeout_secs),
            log_file: args.log_file,
            settings: Settings {
                page_size: args.page_size,
                debounce_ms: args.debounce_ms,
                scroll_threshold: args.scroll_threshold,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.page_size == 0 {
            return Err(ConfigError::EmptyPage);
        }
        if self.settings.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageTooLarge(self.settings.page_size));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBase(self.api_base.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn defaults_to_korean_pages_of_twenty() {
        let cli = Cli::parse_from(["pokedex-ko"]);
        let config = Config::from_args(cli.config).unwrap();
        assert_eq!(config.language, "ko");
        assert_eq!(config.settings.page_size, 20);
        assert_eq!(config.settings.debounce_ms, 300);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let cli = Cli::parse_from(["pokedex-ko", "--api-base", "http://localhost:8080/api/v2/"]);
        let config = Config::from_args(cli.config).unwrap();
        assert_eq!(config.api_base, "http://localhost:8080/api/v2");
    }

    #[test]
    fn rejects_zero_page_size() {
        let cli = Cli::parse_from(["pokedex-ko", "--page-size", "0"]);
        assert_eq!(Config::from_args(cli.config), Err(ConfigError::EmptyPage));
    }

    #[test]
    fn rejects_oversized_page() {
        let cli = Cli::parse_from(["pokedex-ko", "--page-size", "4294967295"]);
        assert_eq!(
            Config::from_args(cli.config),
            Err(ConfigError::PageTooLarge(u32::MAX))
        );

        let cli = Cli::parse_from(["pokedex-ko", "--page-size", "200"]);
        assert_eq!(Config::from_args(cli.config).unwrap().settings.page_size, 200);
    }

    #[test]
    fn rejects_non_http_base() {
        let cli = Cli::parse_from(["pokedex-ko", "--api-base", "ftp://pokeapi"]);
        assert!(matches!(
            Config::from_args(cli.config),
            Err(ConfigError::InvalidApiBase(_))
        ));
    }
}
