use crate::model::{Field, FieldError, User, UserId};
use crate::ui::mvi::UiState;

use super::form::UserForm;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Create,
    Edit {
        id: UserId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorStatus {
    /// Waiting for the user being edited.
    Loading,
    #[default]
    Ready,
    Submitting,
    Saved,
    /// Load or save failed; see `banner` and `field_errors`.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    pub mode: EditorMode,
    pub status: EditorStatus,
    pub form: UserForm,
    /// Server state the form started from; what discard returns to.
    pub original: Option<User>,
    pub field_errors: Vec<FieldError>,
    /// Error that belongs to no single field.
    pub banner: Option<String>,
    /// Form differs from `original` by user input.
    pub dirty: bool,
}

impl UiState for EditorState {}

impl EditorState {
    pub fn editing(&self) -> Option<&UserId> {
        match &self.mode {
            EditorMode::Edit { id } => Some(id),
            EditorMode::Create => None,
        }
    }

    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.status, EditorStatus::Loading | EditorStatus::Submitting)
    }
}
