use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use catalog_core::{AttemptId, Effect, LoadError, Msg};
use catalog_engine::{EngineEvent, EngineHandle, FailureKind, FetchError, FetchSettings};
use catalog_logging::{catalog_info, catalog_warn};

/// Executes effects on the engine and turns its events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    /// Completions produced locally, delivered before engine events.
    pending: VecDeque<Msg>,
}

impl EffectRunner {
    pub fn new(settings: FetchSettings) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::new(settings)?,
            pending: VecDeque::new(),
        })
    }

    #[cfg(test)]
    pub fn with_fetcher(fetcher: std::sync::Arc<dyn catalog_engine::Fetcher>) -> io::Result<Self> {
        Ok(Self {
            engine: EngineHandle::with_fetcher(fetcher)?,
            pending: VecDeque::new(),
        })
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchDocument {
                    attempt_id,
                    location,
                } => {
                    catalog_info!("FetchDocument attempt_id={} location={}", attempt_id, location);
                    if !self.engine.fetch(attempt_id, location) {
                        self.pending.push_back(engine_stopped(attempt_id));
                    }
                }
            }
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        if let Some(msg) = self.pending.pop_front() {
            return Some(msg);
        }
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }
}

/// An attempt the engine never accepted fails as a network error instead of loading forever.
fn engine_stopped(attempt_id: AttemptId) -> Msg {
    Msg::FetchCompleted {
        attempt_id,
        result: Err(LoadError::Network {
            status: None,
            message: "fetch engine stopped".to_string(),
        }),
    }
}

fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::DocumentLoaded { attempt_id, result } => Msg::FetchCompleted {
            attempt_id,
            result: result
                .map(|doc| doc.document)
                .map_err(|err| map_fetch_error(&err)),
        },
    }
}

/// Collapses transport detail into the two error kinds the page distinguishes.
pub fn map_fetch_error(err: &FetchError) -> LoadError {
    if err.is_parse_failure() {
        catalog_warn!("document could not be parsed: {}", err);
        return LoadError::Parse {
            message: err.message.clone(),
        };
    }
    let status = match err.kind {
        FailureKind::HttpStatus(code) => Some(code),
        _ => None,
    };
    catalog_warn!("document could not be fetched: {}", err);
    LoadError::Network {
        status,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_engine::FetchMetadata;

    #[test]
    fn http_status_maps_to_network_error_with_status() {
        let err = FetchError {
            kind: FailureKind::HttpStatus(404),
            message: "404 Not Found".to_string(),
        };
        assert_eq!(
            map_fetch_error(&err),
            LoadError::Network {
                status: Some(404),
                message: "http status 404: 404 Not Found".to_string(),
            }
        );
    }

    #[test]
    fn decode_and_parse_map_to_parse_error() {
        for kind in [FailureKind::Decode, FailureKind::Parse] {
            let err = FetchError {
                kind,
                message: "bad".to_string(),
            };
            assert_eq!(
                map_fetch_error(&err),
                LoadError::Parse {
                    message: "bad".to_string()
                }
            );
        }
    }

    #[test]
    fn transport_failures_map_to_network_error_without_status() {
        let err = FetchError {
            kind: FailureKind::TooLarge {
                max_bytes: 10,
                actual: Some(11),
            },
            message: "response too large".to_string(),
        };
        assert!(matches!(
            map_fetch_error(&err),
            LoadError::Network { status: None, .. }
        ));
    }

    #[test]
    fn stopped_engine_fails_the_attempt_instead_of_hanging() {
        let state = catalog_core::PageState::new(catalog_core::PageConfig::default());
        let (state, _) = catalog_core::update(state, Msg::PageOpened);
        let attempt_id = state.latest_attempt();
        let (state, _) = catalog_core::update(state, engine_stopped(attempt_id));
        assert!(matches!(
            state.view_state(),
            catalog_core::ViewState::Error(LoadError::Network { status: None, .. })
        ));
    }

    #[test]
    fn loaded_documents_become_completions() {
        let event = EngineEvent::DocumentLoaded {
            attempt_id: 3,
            result: Ok(catalog_engine::FetchedDocument {
                document: serde_json::json!([]),
                metadata: FetchMetadata {
                    location: "blog.json".to_string(),
                    resolved: "blog.json".to_string(),
                    content_type: None,
                    byte_len: 2,
                },
            }),
        };
        assert_eq!(
            event_to_msg(event),
            Msg::FetchCompleted {
                attempt_id: 3,
                result: Ok(serde_json::json!([])),
            }
        );
    }
}
