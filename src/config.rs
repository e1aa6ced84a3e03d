use std::path::PathBuf;
use std::time::Duration;

use crate::ingest::DEFAULT_CHUNK_SIZE;
use crate::source::DataSource;
use crate::viewport::DEFAULT_OVERSCAN;

pub const DEFAULT_DATA_URL: &str = "http://localhost:5173/enzymes.json.gz";
pub const DEFAULT_URL_ENV: &str = "SPARQL_VIEWER_DEFAULT_URL";
const DEFAULT_TABLE_HEIGHT: f32 = 500.0;
const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub chunk_size: usize,
    pub default_data_url: String,
    pub fetch_timeout: Duration,
    pub table_height: f32,
    pub overscan: usize,
    /// Opened instead of the default dataset when set.
    pub startup_file: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_data_url: DEFAULT_DATA_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            table_height: DEFAULT_TABLE_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
            startup_file: None,
        }
    }
}

impl ViewerConfig {
    /// Defaults, the default-data URL override from the environment and the
    /// first positional argument as the startup file.
    pub fn from_env() -> Self {
        Self::from_parts(
            std::env::var(DEFAULT_URL_ENV).ok(),
            std::env::args_os().nth(1).map(PathBuf::from),
        )
    }

    fn from_parts(url_override: Option<String>, startup_file: Option<PathBuf>) -> Self {
        let mut config = Self::default();
        if let Some(url) = url_override.filter(|u| !u.trim().is_empty()) {
            config.default_data_url = url.trim().to_string();
        }
        config.startup_file = startup_file;
        config
    }

    pub fn default_source(&self) -> DataSource {
        DataSource::Default {
            url: self.default_data_url.clone(),
            timeout: self.fetch_timeout,
        }
    }
}
