use crate::cache::CacheEntry;
use crate::gateway::GatewayError;
use crate::model::{Field, FieldError, User, UserId};
use crate::ui::mvi::Intent;

use super::form::UserForm;

#[derive(Debug, Clone)]
pub enum EditorIntent {
    /// Start a new user, optionally from a saved draft.
    OpenCreate { draft: Option<UserForm> },
    /// Start editing `id`, optionally from a saved draft.
    OpenEdit { id: UserId, draft: Option<UserForm> },
    /// The cache entry of the edited user changed.
    EntryChanged { id: UserId, entry: CacheEntry },
    FieldChanged { field: Field, value: String },
    ValidationFailed { errors: Vec<FieldError> },
    Submitted,
    SubmitSucceeded { user: User },
    SubmitFailed { error: GatewayError },
    /// Drop local input and return to server state.
    Discarded,
}

impl Intent for EditorIntent {}
