use crate::{Effect, Msg, PageState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageOpened => {
            // Only the first open issues a fetch; reloading data needs an explicit retry.
            if state.latest_attempt() == 0 {
                vec![state.begin_attempt()]
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked => vec![state.begin_attempt()],
        Msg::FetchCompleted { attempt_id, result } => {
            state.complete_attempt(attempt_id, result);
            Vec::new()
        }
        Msg::SearchChanged(text) => {
            state.set_search(text);
            Vec::new()
        }
        Msg::SortChanged(sort) => {
            state.set_sort(sort);
            Vec::new()
        }
        Msg::SelectionChanged(id) => {
            state.set_selected_id(id);
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}
