use crate::{AttemptId, LoadError, SortMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page initialization; starts the first load attempt.
    PageOpened,
    /// User clicked Retry; starts a fresh attempt whatever the current state.
    RetryClicked,
    /// The fetcher finished an attempt with a parsed document or a failure.
    FetchCompleted {
        attempt_id: AttemptId,
        result: Result<serde_json::Value, LoadError>,
    },
    /// User edited the search box. Applied on every input event.
    SearchChanged(String),
    /// User picked a sort mode.
    SortChanged(SortMode),
    /// The page's `id` query parameter changed.
    SelectionChanged(Option<String>),
    /// UI/render tick to coalesce rendering.
    Tick,
}
