//! Settings read from `~/.config/marquee/config.toml`.
//!
//! Every key is optional. A missing or blank file means built-in defaults.
//! Keys this version does not know are logged and otherwise ignored.
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Files above this size are refused outright (1 MB).
const MAX_CONFIG_BYTES: u64 = 1_048_576;

const SETTINGS: [&str; 4] = [
    "page_size",
    "response_cache_pages",
    "recent_queries_max",
    "fetch_delay_ms",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config is {size} bytes, limit is 1 MB")]
    TooLarge { size: u64 },

    #[error("Config value out of range: {0}")]
    Invalid(&'static str),
}

/// Tunables for the catalog source, response cache and search history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Movies per page served by the catalog source.
    pub page_size: u32,

    /// Pages kept in the in-memory response cache. 0 disables caching.
    pub response_cache_pages: usize,

    /// Maximum number of remembered search queries.
    pub recent_queries_max: usize,

    /// Artificial latency added to every catalog fetch, in milliseconds.
    pub fetch_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 20,
            response_cache_pages: 64,
            recent_queries_max: 10,
            fetch_delay_ms: 0,
        }
    }
}

impl Config {
    /// Read settings from `path`, falling back to defaults when the file is absent or blank.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let Some(content) = read_limited(path)? else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        };
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Blank config file, using defaults");
            return Ok(Self::default());
        }

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            response_cache_pages = config.response_cache_pages,
            recent_queries_max = config.recent_queries_max,
            "Config loaded"
        );
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse()?;
        for key in table.keys().filter(|k| !SETTINGS.contains(&k.as_str())) {
            tracing::warn!(key = %key, "Ignoring unknown config key");
        }

        let config: Config = toml::from_str(content)?;
        if config.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1"));
        }
        Ok(config)
    }
}

/// File contents, or `None` if the file does not exist.
fn read_limited(path: &Path) -> Result<Option<String>, ConfigError> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if size > MAX_CONFIG_BYTES {
        return Err(ConfigError::TooLarge { size });
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        // Removed between the metadata call and the read.
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
