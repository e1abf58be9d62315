use crate::ui::mvi::Reducer;

use super::intent::ListIntent;
use super::state::UserListState;

pub struct ListReducer;

impl Reducer for ListReducer {
    type State = UserListState;
    type Intent = ListIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ListIntent::SearchChanged { search } => {
                let search = search.filter(|s| !s.is_empty());
                if search == state.search {
                    return state;
                }
                UserListState {
                    search,
                    ..UserListState::default()
                }
            }
            ListIntent::EntryChanged { key, entry } => {
                if key != state.key() {
                    // Result of a search the user has moved on from.
                    return state;
                }
                UserListState {
                    users: entry
                        .users()
                        .map(<[_]>::to_vec)
                        .unwrap_or(state.users),
                    status: entry.status,
                    error: entry.error,
                    stale: entry.invalidated,
                    search: state.search,
                }
            }
        }
    }
}
