use crate::cache::CacheSubscription;
use crate::gateway::{ErrorKind, GatewayError};
use crate::model::{Field, UserId};
use crate::mutation::{Mutation, MutationCoordinator, MutationError, MutationOutput};
use crate::queries::UserQueries;
use crate::ui::drafts::{DraftKey, DraftStore};
use crate::ui::mvi::dispatch_mvi;
use crate::ui::notify::Notifier;

use super::intent::EditorIntent;
use super::reducer::EditorReducer;
use super::state::{EditorMode, EditorState};

/// What a submit attempt ended in.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid,
    Saved(MutationOutput),
    Failed(MutationError),
}

/// Binds an [`EditorState`] to the cache, the coordinator, and drafts.
pub struct UserEditor {
    queries: UserQueries,
    coordinator: MutationCoordinator,
    notifier: Notifier,
    drafts: DraftStore,
    state: EditorState,
    subscription: Option<CacheSubscription>,
    /// Last failed mutation, kept while it may be retried.
    pending: Option<Mutation>,
}

impl UserEditor {
    pub fn new(
        queries: UserQueries,
        coordinator: MutationCoordinator,
        notifier: Notifier,
        drafts: DraftStore,
    ) -> Self {
        Self {
            queries,
            coordinator,
            notifier,
            drafts,
            state: EditorState::default(),
            subscription: None,
            pending: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    fn dispatch(&mut self, intent: EditorIntent) {
        dispatch_mvi!(self, state, EditorReducer, intent);
    }

    fn draft_key(&self) -> DraftKey {
        match &self.state.mode {
            EditorMode::Create => DraftKey::New,
            EditorMode::Edit { id } => DraftKey::Edit(id.clone()),
        }
    }

    pub fn open_create(&mut self) {
        let draft = self.drafts.load(&DraftKey::New);
        self.subscription = None;
        self.pending = None;
        self.dispatch(EditorIntent::OpenCreate { draft });
    }

    /// Opens `id` for editing and loads it through the cache.
    pub async fn open_edit(&mut self, id: UserId) -> &EditorState {
        let draft = self.drafts.load(&DraftKey::Edit(id.clone()));
        self.pending = None;
        self.subscription = Some(self.queries.watch_user(&id));
        self.dispatch(EditorIntent::OpenEdit {
            id: id.clone(),
            draft,
        });

        let entry = self.queries.user(&id).await;
        if let Some(subscription) = self.subscription.as_mut() {
            subscription.take_change();
        }
        self.dispatch(EditorIntent::EntryChanged { id, entry });
        &self.state
    }

    /// Applies a pending change of the edited user's cache entry.
    pub fn sync(&mut self) -> bool {
        let Some(id) = self.state.editing().cloned() else {
            return false;
        };
        let Some(entry) = self
            .subscription
            .as_mut()
            .and_then(CacheSubscription::take_change)
        else {
            return false;
        };
        self.dispatch(EditorIntent::EntryChanged { id, entry });
        true
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.dispatch(EditorIntent::FieldChanged {
            field,
            value: value.into(),
        });
        self.drafts.save(&self.draft_key(), &self.state.form);
    }

    /// Whether [`retry`](Self::retry) would resend a failed mutation.
    pub fn can_retry(&self) -> bool {
        self.pending.as_ref().is_some_and(Mutation::can_retry)
    }

    /// Validates and saves the form.
    ///
    /// A retryable failure of the same input is resent as the same
    /// mutation, so its original snapshot is reused.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let input = match self.state.form.to_input() {
            Ok(input) => input,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "Form rejected locally");
                self.dispatch(EditorIntent::ValidationFailed { errors });
                return SubmitOutcome::Invalid;
            }
        };

        let mut mutation = match self.pending.take() {
            Some(pending) if pending.can_retry() && pending.kind().input() == Some(&input) => {
                pending
            }
            _ => match &self.state.mode {
                EditorMode::Create => Mutation::create(input),
                EditorMode::Edit { id } => Mutation::update(id.clone(), input),
            },
        };

        self.dispatch(EditorIntent::Submitted);
        match self.coordinator.execute(&mut mutation).await {
            Ok(output) => {
                self.notifier.success(output.success_message());
                self.drafts.clear(&self.draft_key());
                if let MutationOutput::Created(user) = &output {
                    self.subscription = Some(self.queries.watch_user(&user.id));
                }
                if let Some(user) = output.user() {
                    self.dispatch(EditorIntent::SubmitSucceeded { user: user.clone() });
                }
                SubmitOutcome::Saved(output)
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                let error = err
                    .gateway()
                    .cloned()
                    .unwrap_or_else(|| GatewayError::new(ErrorKind::Unknown, err.to_string()));
                self.dispatch(EditorIntent::SubmitFailed { error });
                self.drafts.save(&self.draft_key(), &self.state.form);
                if mutation.can_retry() {
                    self.pending = Some(mutation);
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Resubmits after a failure.
    pub async fn retry(&mut self) -> SubmitOutcome {
        self.submit().await
    }

    /// Drops local input and any pending retry, returning to server state.
    pub fn discard(&mut self) {
        self.drafts.clear(&self.draft_key());
        self.pending = None;
        self.dispatch(EditorIntent::Discarded);
    }
}
