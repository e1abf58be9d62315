//! Create/update/delete with optimistic cache edits and rollback.
//!
//! A [`Mutation`] is a value the caller keeps: it records its state, the
//! snapshot taken before its optimistic edit, and its last error, so a
//! failed mutation can be executed again without re-snapshotting.

mod coordinator;
mod snapshot;

pub use coordinator::MutationCoordinator;
pub use snapshot::MutationSnapshot;

use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::model::{User, UserId, UserInput};

/// What a mutation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Create { input: UserInput },
    Update { id: UserId, input: UserInput },
    Delete { id: UserId },
}

impl MutationKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// The user the mutation targets; `None` for a create.
    pub fn target(&self) -> Option<&UserId> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } => Some(id),
        }
    }

    pub fn input(&self) -> Option<&UserInput> {
        match self {
            Self::Create { input } | Self::Update { input, .. } => Some(input),
            Self::Delete { .. } => None,
        }
    }
}

/// `Idle -> Optimistic -> (Committed | RolledBack)`.
///
/// `RolledBack -> Optimistic` happens only when a retryable failure is
/// executed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    Optimistic,
    Committed,
    RolledBack,
}

/// One create/update/delete and its reconciliation state.
#[derive(Debug, Clone)]
pub struct Mutation {
    id: Uuid,
    kind: MutationKind,
    state: MutationState,
    snapshot: Option<MutationSnapshot>,
    last_error: Option<GatewayError>,
    attempts: u32,
}

impl Mutation {
    pub fn new(kind: MutationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            state: MutationState::Idle,
            snapshot: None,
            last_error: None,
            attempts: 0,
        }
    }

    pub fn create(input: UserInput) -> Self {
        Self::new(MutationKind::Create { input })
    }

    pub fn update(id: UserId, input: UserInput) -> Self {
        Self::new(MutationKind::Update { id, input })
    }

    pub fn delete(id: UserId) -> Self {
        Self::new(MutationKind::Delete { id })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The snapshot kept from the first attempt, if any.
    pub fn snapshot(&self) -> Option<&MutationSnapshot> {
        self.snapshot.as_ref()
    }

    /// Whether executing again is allowed.
    pub fn can_retry(&self) -> bool {
        self.state == MutationState::RolledBack
            && self.last_error.as_ref().is_some_and(GatewayError::is_retryable)
    }
}

/// Result of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutput {
    Created(User),
    Updated(User),
    Deleted(UserId),
}

impl MutationOutput {
    /// The user as returned by the server; `None` after a delete.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Created(user) | Self::Updated(user) => Some(user),
            Self::Deleted(_) => None,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Created(_) => "User created successfully",
            Self::Updated(_) => "User updated successfully",
            Self::Deleted(_) => "User deleted successfully",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The gateway call failed; the cache has been rolled back.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Mutation {0} has already been committed")]
    AlreadyCommitted(Uuid),

    #[error("Mutation {0} failed with an error that cannot be retried")]
    NotRetryable(Uuid),
}

impl MutationError {
    /// The gateway error behind this failure, if any.
    pub fn gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Gateway(err) => err.error_type(),
            Self::AlreadyCommitted(_) => "already_committed",
            Self::NotRetryable(_) => "not_retryable",
        }
    }
}
