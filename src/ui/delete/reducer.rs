use crate::ui::mvi::Reducer;

use super::intent::DeleteIntent;
use super::state::DeleteDialogState;

pub struct DeleteReducer;

impl Reducer for DeleteReducer {
    type State = DeleteDialogState;
    type Intent = DeleteIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match (state, intent) {
            // A delete in flight can't be replaced or cancelled.
            (state @ DeleteDialogState::Deleting { .. }, DeleteIntent::Request { .. })
            | (state @ DeleteDialogState::Deleting { .. }, DeleteIntent::Cancel) => state,

            (_, DeleteIntent::Request { id, name }) => DeleteDialogState::Confirming { id, name },
            (_, DeleteIntent::Cancel) => DeleteDialogState::Hidden,

            (DeleteDialogState::Confirming { id, name }, DeleteIntent::Confirm)
            | (DeleteDialogState::Failed { id, name, .. }, DeleteIntent::Confirm) => {
                DeleteDialogState::Deleting { id, name }
            }

            (DeleteDialogState::Deleting { .. }, DeleteIntent::Succeeded) => {
                DeleteDialogState::Hidden
            }
            (DeleteDialogState::Deleting { id, name }, DeleteIntent::Failed { error }) => {
                DeleteDialogState::Failed { id, name, error }
            }

            (state, _) => state,
        }
    }
}
