use crate::gateway::{ErrorKind, GatewayError};
use crate::model::{Field, FieldError};
use crate::ui::mvi::Reducer;

use super::form::UserForm;
use super::intent::EditorIntent;
use super::state::{EditorMode, EditorState, EditorStatus};

pub struct EditorReducer;

impl Reducer for EditorReducer {
    type State = EditorState;
    type Intent = EditorIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            EditorIntent::OpenCreate { draft } => EditorState {
                dirty: draft.is_some(),
                form: draft.unwrap_or_default(),
                ..EditorState::default()
            },
            EditorIntent::OpenEdit { id, draft } => EditorState {
                mode: EditorMode::Edit { id },
                status: EditorStatus::Loading,
                dirty: draft.is_some(),
                form: draft.unwrap_or_default(),
                ..EditorState::default()
            },
            EditorIntent::EntryChanged { id, entry } => {
                if state.editing() != Some(&id) {
                    return state;
                }
                let mut next = state;
                if let Some(user) = entry.user() {
                    if !next.dirty {
                        next.form = UserForm::from(user);
                    }
                    next.original = Some(user.clone());
                    if next.status == EditorStatus::Loading {
                        next.status = EditorStatus::Ready;
                    }
                } else if let Some(error) = &entry.error {
                    if next.status == EditorStatus::Loading {
                        next.status = EditorStatus::Failed;
                        next.banner = Some(error.message().to_string());
                    }
                }
                next
            }
            EditorIntent::FieldChanged { field, value } => {
                let mut next = state;
                next.form.set(field, value);
                next.field_errors.retain(|e| e.field != field);
                next.dirty = true;
                if next.status == EditorStatus::Saved {
                    next.status = EditorStatus::Ready;
                }
                next
            }
            EditorIntent::ValidationFailed { errors } => EditorState {
                field_errors: errors,
                status: EditorStatus::Ready,
                banner: None,
                ..state
            },
            EditorIntent::Submitted => EditorState {
                status: EditorStatus::Submitting,
                field_errors: Vec::new(),
                banner: None,
                ..state
            },
            EditorIntent::SubmitSucceeded { user } => EditorState {
                mode: EditorMode::Edit {
                    id: user.id.clone(),
                },
                status: EditorStatus::Saved,
                form: UserForm::from(&user),
                original: Some(user),
                field_errors: Vec::new(),
                banner: None,
                dirty: false,
            },
            EditorIntent::SubmitFailed { error } => {
                let (field_errors, banner) = place_error(&error);
                EditorState {
                    status: EditorStatus::Failed,
                    field_errors,
                    banner,
                    ..state
                }
            }
            EditorIntent::Discarded => EditorState {
                form: state
                    .original
                    .as_ref()
                    .map(UserForm::from)
                    .unwrap_or_default(),
                status: EditorStatus::Ready,
                field_errors: Vec::new(),
                banner: None,
                dirty: false,
                ..state
            },
        }
    }
}

/// Server validation errors land on the field they name, when they name one.
fn place_error(error: &GatewayError) -> (Vec<FieldError>, Option<String>) {
    if error.kind() == ErrorKind::Validation {
        if let Some(field) = Field::mentioned_in(error.message()) {
            return (vec![FieldError::new(field, error.message())], None);
        }
    }
    (Vec::new(), Some(error.message().to_string()))
}
