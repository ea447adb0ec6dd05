use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog_core::{DisplayConfig, PageConfig, PageKind};
use catalog_engine::FetchSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::logging::LogDestination;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid site_base {value:?}: {source}")]
    SiteBase {
        value: String,
        source: url::ParseError,
    },
}

/// Transport limits for feed fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_bytes: u64,
    pub redirect_limit: usize,
    pub connect_timeout_ms: Option<u64>,
    /// Unset by default: a hung fetch keeps the page loading.
    pub request_timeout_ms: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            max_bytes: defaults.max_bytes,
            redirect_limit: defaults.redirect_limit,
            connect_timeout_ms: None,
            request_timeout_ms: None,
        }
    }
}

/// Site-wide settings read from `catalog.ron`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub data_source: String,
    pub site_base: Option<String>,
    pub display: DisplayConfig,
    pub session_dir: PathBuf,
    pub log: LogDestination,
    pub fetch: FetchConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_source: PageConfig::default().data_source,
            site_base: None,
            display: DisplayConfig::default(),
            session_dir: PathBuf::from(".catalog_session"),
            log: LogDestination::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn fetch_settings(&self) -> Result<FetchSettings, ConfigError> {
        let site_base = self
            .site_base
            .as_deref()
            .map(|value| {
                Url::parse(value).map_err(|source| ConfigError::SiteBase {
                    value: value.to_string(),
                    source,
                })
            })
            .transpose()?;
        Ok(FetchSettings {
            connect_timeout: self.fetch.connect_timeout_ms.map(Duration::from_millis),
            request_timeout: self.fetch.request_timeout_ms.map(Duration::from_millis),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            site_base,
        })
    }

    pub fn page(&self, kind: PageKind, selected_id: Option<String>) -> PageConfig {
        PageConfig {
            kind,
            data_source: self.data_source.clone(),
            selected_id,
            display: self.display.clone(),
        }
    }
}
