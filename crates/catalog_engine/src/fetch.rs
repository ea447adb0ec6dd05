use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use url::Url;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// `None` waits indefinitely; a hung fetch keeps the page loading.
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Base for relative locations. Without one, relative locations are local paths.
    pub site_base: Option<Url>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            request_timeout: None,
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            site_base: None,
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves the current content at `location`, bypassing caches. Never retries.
    async fn fetch(&self, location: &str) -> Result<FetchOutput, FetchError>;
}

/// Where a configured location points once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Remote(Url),
    Local(PathBuf),
}

/// Resolves `location` the way a page resolves a relative fetch: absolute `http(s)` URLs
/// stay as they are, relative ones join `site_base`, and without a base they name a file.
pub fn resolve_location(location: &str, site_base: Option<&Url>) -> Result<SourceLocation, FetchError> {
    match Url::parse(location) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(SourceLocation::Remote(url)),
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map(SourceLocation::Local)
            .map_err(|()| FetchError::new(FailureKind::InvalidLocation, location)),
        Ok(url) => Err(FetchError::new(
            FailureKind::InvalidLocation,
            format!("unsupported scheme {}", url.scheme()),
        )),
        Err(url::ParseError::RelativeUrlWithoutBase) => match site_base {
            Some(base) => base
                .join(location)
                .map(SourceLocation::Remote)
                .map_err(|err| FetchError::new(FailureKind::InvalidLocation, err.to_string())),
            None => Ok(SourceLocation::Local(PathBuf::from(location))),
        },
        Err(err) => Err(FetchError::new(FailureKind::InvalidLocation, err.to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit));
        if let Some(timeout) = self.settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    async fn fetch_url(&self, location: &str, url: Url) -> Result<FetchOutput, FetchError> {
        let client = self.build_client()?;

        let response = client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let resolved = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            location: location.to_string(),
            resolved,
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(FetchOutput { bytes, metadata })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchOutput, FetchError> {
        let url = Url::parse(location)
            .map_err(|err| FetchError::new(FailureKind::InvalidLocation, err.to_string()))?;
        self.fetch_url(location, url).await
    }
}

/// Reads feed documents from the local filesystem. There is no cache to bypass.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    max_bytes: u64,
}

impl FileFetcher {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    async fn read_path(&self, location: &str, path: PathBuf) -> Result<FetchOutput, FetchError> {
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|err| FetchError::new(FailureKind::Io, format!("{}: {err}", path.display())))?;
        let len = bytes.len() as u64;
        if len > self.max_bytes {
            return Err(too_large(self.max_bytes, len));
        }
        Ok(FetchOutput {
            bytes,
            metadata: FetchMetadata {
                location: location.to_string(),
                resolved: path.display().to_string(),
                content_type: Some("application/json".to_string()),
                byte_len: len,
            },
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchOutput, FetchError> {
        match resolve_location(location, None)? {
            SourceLocation::Local(path) => self.read_path(location, path).await,
            SourceLocation::Remote(url) => Err(FetchError::new(
                FailureKind::InvalidLocation,
                format!("not a local path: {url}"),
            )),
        }
    }
}

/// Dispatches each location to HTTP or the filesystem after resolving it.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    site_base: Option<Url>,
    remote: ReqwestFetcher,
    local: FileFetcher,
}

impl SourceFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self {
            site_base: settings.site_base.clone(),
            local: FileFetcher::new(settings.max_bytes),
            remote: ReqwestFetcher::new(settings),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchOutput, FetchError> {
        match resolve_location(location, self.site_base.as_ref())? {
            SourceLocation::Remote(url) => self.remote.fetch_url(location, url).await,
            SourceLocation::Local(path) => self.local.read_path(location, path).await,
        }
    }
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
