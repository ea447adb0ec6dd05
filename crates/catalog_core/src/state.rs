use std::fmt;

use url::form_urlencoded;

use crate::config::PageConfig;
use crate::entity::Collection;
use crate::normalize::normalize;
use crate::query::{Query, SortMode};
use crate::view_model::PageViewModel;
use crate::Effect;

/// Monotonically increasing tag of a fetch attempt. Zero means no attempt issued yet.
pub type AttemptId = u64;

/// Why a load attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Non-success status or transport failure.
    Network { status: Option<u16>, message: String },
    /// The document could not be decoded or parsed as JSON.
    Parse { message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network {
                status: Some(code),
                message,
            } => write!(f, "network error (http {code}): {message}"),
            LoadError::Network {
                status: None,
                message,
            } => write!(f, "network error: {message}"),
            LoadError::Parse { message } => write!(f, "parse error: {message}"),
        }
    }
}

/// Status of the current load attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Loading,
    /// The document parsed but held no valid entities.
    Empty,
    Error(LoadError),
    Ready(Collection),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }
}

/// State of one page session (listing or detail page).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageState {
    config: PageConfig,
    latest_attempt: AttemptId,
    view_state: ViewState,
    query: Query,
    dropped_records: usize,
    stale_results: usize,
    dirty: bool,
}

impl PageState {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn latest_attempt(&self) -> AttemptId {
        self.latest_attempt
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Records dropped by the normalizer in the applied attempt.
    pub fn dropped_records(&self) -> usize {
        self.dropped_records
    }

    /// Completions discarded because a newer attempt had been issued.
    pub fn stale_results(&self) -> usize {
        self.stale_results
    }

    pub fn view(&self) -> PageViewModel {
        PageViewModel::build(self)
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Starts a fresh attempt: the previous collection is discarded and the state returns
    /// to `Loading`. Any completion for an older attempt is ignored from now on.
    pub(crate) fn begin_attempt(&mut self) -> Effect {
        self.latest_attempt += 1;
        self.view_state = ViewState::Loading;
        self.dropped_records = 0;
        self.dirty = true;
        Effect::FetchDocument {
            attempt_id: self.latest_attempt,
            location: self.config.data_source.clone(),
        }
    }

    /// Applies a fetch outcome if it belongs to the latest attempt and that attempt is still
    /// loading. Returns `false` for stale or duplicate completions.
    pub(crate) fn complete_attempt(
        &mut self,
        attempt_id: AttemptId,
        result: Result<serde_json::Value, LoadError>,
    ) -> bool {
        if attempt_id != self.latest_attempt || !self.view_state.is_loading() {
            self.stale_results += 1;
            return false;
        }

        self.view_state = match result {
            Err(err) => ViewState::Error(err),
            Ok(document) => {
                let normalized = normalize(&document);
                self.dropped_records = normalized.dropped;
                if normalized.entities.is_empty() {
                    ViewState::Empty
                } else {
                    ViewState::Ready(normalized.entities.into())
                }
            }
        };
        self.dirty = true;
        true
    }

    pub(crate) fn set_search(&mut self, text: String) {
        if self.query.text != text {
            self.query.text = text;
            self.dirty = true;
        }
    }

    pub(crate) fn set_sort(&mut self, sort: SortMode) {
        if self.query.sort != sort {
            self.query.sort = sort;
            self.dirty = true;
        }
    }

    pub(crate) fn set_selected_id(&mut self, id: Option<String>) {
        let id = id.filter(|id| !id.is_empty());
        if self.config.selected_id != id {
            self.config.selected_id = id;
            self.dirty = true;
        }
    }
}

/// Extracts the `id` query parameter from an absolute or relative page URL.
/// An empty value counts as absent.
pub fn selected_id_from_url(page_url: &str) -> Option<String> {
    let query = page_url.split_once('?')?.1;
    let query = query.split_once('#').map_or(query, |(q, _)| q);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::selected_id_from_url;

    #[test]
    fn id_is_read_from_query_string() {
        assert_eq!(selected_id_from_url("curso.html?id=tdah-1").as_deref(), Some("tdah-1"));
        assert_eq!(
            selected_id_from_url("https://x.cl/blog.html?ref=nav&id=a%20b#top").as_deref(),
            Some("a b")
        );
        assert_eq!(selected_id_from_url("curso.html?id="), None);
        assert_eq!(selected_id_from_url("curso.html"), None);
    }
}
