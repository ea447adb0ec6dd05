use std::fmt;

/// Tag of the fetch attempt a command or event belongs to.
pub type AttemptId = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A fetch attempt finished, successfully parsed or not.
    DocumentLoaded {
        attempt_id: AttemptId,
        result: Result<FetchedDocument, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub document: serde_json::Value,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    /// Location as requested.
    pub location: String,
    /// URL or path actually read, after base resolution and redirects.
    pub resolved: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Decode and parse failures concern the document; everything else is transport.
    pub fn is_parse_failure(&self) -> bool {
        matches!(self.kind, FailureKind::Decode | FailureKind::Parse)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidLocation,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
    Decode,
    Parse,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidLocation => write!(f, "invalid location"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::Parse => write!(f, "malformed json"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
