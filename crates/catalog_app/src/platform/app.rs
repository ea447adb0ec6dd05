use std::time::Duration;

use catalog_core::{update, Msg, PageConfig, PageState, PageViewModel, SortMode, ViewState};
use catalog_logging::{catalog_debug, catalog_info, catalog_warn, set_current_attempt};

use super::effects::EffectRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// User input applied to a page session before and while it loads.
#[derive(Debug, Clone, Default)]
pub struct PageInput {
    pub search: Option<String>,
    pub sort: Option<SortMode>,
    /// Retries issued after an error, as if the user pressed the retry control.
    pub retries: u32,
}

/// Single-threaded dispatch loop for one page session.
pub struct PageSession {
    state: PageState,
    runner: EffectRunner,
}

impl PageSession {
    pub fn new(config: PageConfig, runner: EffectRunner) -> Self {
        Self {
            state: PageState::new(config),
            runner,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let stale_before = state.stale_results();
        let (mut state, effects) = update(state, msg);
        set_current_attempt(state.latest_attempt());

        if state.stale_results() > stale_before {
            catalog_debug!(
                "discarded stale completion; latest attempt is {}",
                state.latest_attempt()
            );
        }
        if state.consume_dirty() {
            log_transition(&state);
        }
        self.state = state;
        self.runner.enqueue(effects);
    }

    /// Opens the page and pumps engine events until it leaves `Loading`,
    /// retrying after errors while `input.retries` allows.
    pub fn run(&mut self, input: &PageInput) -> PageViewModel {
        if let Some(sort) = input.sort {
            self.dispatch(Msg::SortChanged(sort));
        }
        if let Some(search) = &input.search {
            self.dispatch(Msg::SearchChanged(search.clone()));
        }
        self.dispatch(Msg::PageOpened);

        let mut retries_left = input.retries;
        loop {
            self.wait_until_settled();
            match self.state.view_state() {
                ViewState::Error(_) if retries_left > 0 => {
                    retries_left -= 1;
                    catalog_info!("retrying, {} retries left", retries_left);
                    self.dispatch(Msg::RetryClicked);
                }
                _ => break,
            }
        }
        self.state.view()
    }

    fn wait_until_settled(&mut self) {
        while self.state.view_state().is_loading() {
            match self.runner.next_msg(POLL_INTERVAL) {
                Some(msg) => self.dispatch(msg),
                None => self.dispatch(Msg::Tick),
            }
        }
    }
}

fn log_transition(state: &PageState) {
    match state.view_state() {
        ViewState::Loading => {
            catalog_debug!("attempt {} loading", state.latest_attempt())
        }
        ViewState::Empty => catalog_info!(
            "attempt {} loaded no usable records ({} dropped)",
            state.latest_attempt(),
            state.dropped_records()
        ),
        ViewState::Error(err) => {
            catalog_warn!("attempt {} failed: {}", state.latest_attempt(), err)
        }
        ViewState::Ready(collection) => {
            catalog_info!(
                "attempt {} ready with {} entities",
                state.latest_attempt(),
                collection.len()
            );
            if state.dropped_records() > 0 {
                catalog_warn!("dropped {} invalid records", state.dropped_records());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use catalog_core::PageStatus;
    use catalog_engine::{FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher};

    use super::*;

    /// Fails the first `failures` fetches with a 503, then serves `body`.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
        body: &'static str,
    }

    #[async_trait::async_trait]
    impl Fetcher for Flaky {
        async fn fetch(&self, location: &str) -> Result<FetchOutput, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(FetchError {
                    kind: FailureKind::HttpStatus(503),
                    message: "503 Service Unavailable".to_string(),
                });
            }
            Ok(FetchOutput {
                bytes: self.body.as_bytes().to_vec(),
                metadata: FetchMetadata {
                    location: location.to_string(),
                    resolved: location.to_string(),
                    content_type: None,
                    byte_len: self.body.len() as u64,
                },
            })
        }
    }

    fn session(failures: usize) -> PageSession {
        let fetcher = Arc::new(Flaky {
            failures,
            calls: AtomicUsize::new(0),
            body: r#"[{"id":"1","title":"Uno","content":"Texto"},{"id":"2","title":"Dos","content":"Más"}]"#,
        });
        let runner = EffectRunner::with_fetcher(fetcher).unwrap();
        PageSession::new(PageConfig::default(), runner)
    }

    #[test]
    fn error_without_retries_is_final() {
        let view = session(1).run(&PageInput::default());
        assert!(matches!(
            view.status,
            PageStatus::Error(catalog_core::LoadError::Network {
                status: Some(503),
                ..
            })
        ));
    }

    #[test]
    fn retries_recover_from_transient_errors() {
        let mut session = session(2);
        let view = session.run(&PageInput {
            retries: 2,
            ..PageInput::default()
        });
        assert_eq!(view.status, PageStatus::Ready);
        assert_eq!(view.attempt_id, 3);
        assert_eq!(session.state().latest_attempt(), 3);
    }

    #[test]
    fn search_is_applied_to_the_loaded_collection() {
        let view = session(0).run(&PageInput {
            search: Some("dos".to_string()),
            sort: Some(SortMode::Alphabetical),
            retries: 0,
        });
        assert_eq!(view.total, 2);
        assert_eq!(view.shown(), 1);
        assert_eq!(view.entries[0].id, "2");
    }
}
