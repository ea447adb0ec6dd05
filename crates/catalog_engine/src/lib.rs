//! Catalog engine: document fetching, decoding and file persistence.
mod decode;
mod engine;
mod fetch;
mod persist;
mod types;

pub use decode::{decode_body, parse_document, DecodeError, DecodedText};
pub use engine::{load_document, EngineHandle};
pub use fetch::{
    resolve_location, FetchSettings, Fetcher, FileFetcher, ReqwestFetcher, SourceFetcher,
    SourceLocation,
};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use types::{
    AttemptId, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchedDocument,
};
