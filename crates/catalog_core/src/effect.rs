use crate::AttemptId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the feed document, bypassing caches, and report back with the same attempt id.
    FetchDocument {
        attempt_id: AttemptId,
        location: String,
    },
}
