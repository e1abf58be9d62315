use crate::gateway::{ErrorKind, GatewayError};
use crate::model::UserId;
use crate::mutation::{Mutation, MutationCoordinator, MutationError};
use crate::ui::mvi::dispatch_mvi;
use crate::ui::notify::Notifier;

use super::intent::DeleteIntent;
use super::reducer::DeleteReducer;
use super::state::DeleteDialogState;

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// Nothing to confirm.
    Ignored,
    Deleted(UserId),
    Failed(MutationError),
}

/// Runs the delete behind a [`DeleteDialogState`].
pub struct DeleteDialog {
    coordinator: MutationCoordinator,
    notifier: Notifier,
    state: DeleteDialogState,
    pending: Option<Mutation>,
}

impl DeleteDialog {
    pub fn new(coordinator: MutationCoordinator, notifier: Notifier) -> Self {
        Self {
            coordinator,
            notifier,
            state: DeleteDialogState::default(),
            pending: None,
        }
    }

    pub fn state(&self) -> &DeleteDialogState {
        &self.state
    }

    fn dispatch(&mut self, intent: DeleteIntent) {
        dispatch_mvi!(self, state, DeleteReducer, intent);
    }

    pub fn request(&mut self, id: UserId, name: impl Into<String>) {
        if self.state.target() != Some(&id) {
            self.pending = None;
        }
        self.dispatch(DeleteIntent::Request {
            id,
            name: name.into(),
        });
    }

    pub fn cancel(&mut self) {
        self.dispatch(DeleteIntent::Cancel);
        if !self.state.is_visible() {
            self.pending = None;
        }
    }

    /// Deletes the user awaiting confirmation.
    ///
    /// After a network failure the same mutation is executed again.
    pub async fn confirm(&mut self) -> DeleteOutcome {
        if !self.state.can_confirm() {
            return DeleteOutcome::Ignored;
        }
        let Some(id) = self.state.target().cloned() else {
            return DeleteOutcome::Ignored;
        };
        let mut mutation = match self.pending.take() {
            Some(pending) if pending.can_retry() => pending,
            _ => Mutation::delete(id.clone()),
        };

        self.dispatch(DeleteIntent::Confirm);
        match self.coordinator.execute(&mut mutation).await {
            Ok(output) => {
                self.notifier.success(output.success_message());
                self.dispatch(DeleteIntent::Succeeded);
                DeleteOutcome::Deleted(id)
            }
            Err(err) => {
                self.notifier.error(err.to_string());
                let error = err
                    .gateway()
                    .cloned()
                    .unwrap_or_else(|| GatewayError::new(ErrorKind::Unknown, err.to_string()));
                self.dispatch(DeleteIntent::Failed { error });
                if mutation.can_retry() {
                    self.pending = Some(mutation);
                }
                DeleteOutcome::Failed(err)
            }
        }
    }
}
