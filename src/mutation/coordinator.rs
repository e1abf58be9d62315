use std::sync::Arc;

use tracing::Instrument;

use crate::cache::{EntityCache, QueryFilter, QueryKey};
use crate::gateway::{GatewayError, UserGateway};
use crate::model::{User, UserId, UserInput};

use super::snapshot::MutationSnapshot;
use super::{Mutation, MutationError, MutationKind, MutationOutput, MutationState};

/// Runs mutations against the gateway and keeps the cache consistent
/// with their outcome.
///
/// The optimistic edit and the rollback are synchronous cache operations;
/// the only suspension point is the gateway call itself. Overlapping
/// mutations are not merged: whichever settles last decides the cache.
#[derive(Clone)]
pub struct MutationCoordinator {
    cache: EntityCache,
    gateway: Arc<dyn UserGateway>,
}

impl MutationCoordinator {
    pub fn new(cache: EntityCache, gateway: Arc<dyn UserGateway>) -> Self {
        Self { cache, gateway }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Executes `mutation`, or re-executes it after a retryable failure.
    ///
    /// On failure the cache is restored from the snapshot taken on the
    /// first attempt and the gateway error is returned. The snapshot is
    /// kept on the mutation only while the failure is retryable.
    pub async fn execute(
        &self,
        mutation: &mut Mutation,
    ) -> Result<MutationOutput, MutationError> {
        match mutation.state {
            MutationState::Committed => return Err(MutationError::AlreadyCommitted(mutation.id)),
            MutationState::RolledBack if !mutation.can_retry() => {
                return Err(MutationError::NotRetryable(mutation.id));
            }
            _ => {}
        }

        let span = tracing::info_span!(
            "mutation",
            id = %mutation.id,
            op = mutation.kind.name(),
            target = mutation.kind.target().map(UserId::as_str),
        );
        self.run(mutation).instrument(span).await
    }

    async fn run(&self, mutation: &mut Mutation) -> Result<MutationOutput, MutationError> {
        mutation.attempts += 1;
        if mutation.attempts > 1 {
            tracing::info!(attempt = mutation.attempts, "Retrying mutation");
        }

        self.apply_optimistic(&mutation.kind, &mut mutation.snapshot);
        mutation.state = MutationState::Optimistic;

        match self.call_gateway(&mutation.kind).await {
            Ok(output) => {
                self.commit(&mutation.kind);
                mutation.state = MutationState::Committed;
                mutation.snapshot = None;
                mutation.last_error = None;
                tracing::info!("Mutation committed");
                Ok(output)
            }
            Err(err) => {
                if let Some(snapshot) = &mutation.snapshot {
                    snapshot.restore(&self.cache);
                }
                mutation.state = MutationState::RolledBack;
                if !err.is_retryable() {
                    mutation.snapshot = None;
                }
                tracing::warn!(
                    error_type = err.error_type(),
                    error = %err,
                    retryable = err.is_retryable(),
                    "Mutation rolled back"
                );
                mutation.last_error = Some(err.clone());
                Err(MutationError::Gateway(err))
            }
        }
    }

    /// Detaches loads that would overwrite the edit, snapshots the
    /// affected entries once, and writes the expected outcome.
    fn apply_optimistic(&self, kind: &MutationKind, snapshot: &mut Option<MutationSnapshot>) {
        match kind {
            MutationKind::Create { .. } => {}
            MutationKind::Update { id, input } => {
                let item = QueryKey::item(id.clone());
                let filters = [QueryFilter::from(item.clone()), QueryFilter::all_collections()];
                for filter in &filters {
                    self.cache.cancel(filter);
                }
                let snapshot = snapshot
                    .get_or_insert_with(|| MutationSnapshot::capture(&self.cache, &filters));

                self.cache
                    .write(&item, |data| data.map(|d| d.with_update(id, input)));
                let rows = self
                    .cache
                    .write_matching(&QueryFilter::all_collections(), |_, data| {
                        data.map(|d| d.with_update(id, input))
                    });
                tracing::debug!(
                    snapshotted = snapshot.len(),
                    collections = rows,
                    "Applied optimistic update"
                );
            }
            MutationKind::Delete { id } => {
                let filters = [QueryFilter::all_collections()];
                self.cache.cancel(&filters[0]);
                let snapshot = snapshot
                    .get_or_insert_with(|| MutationSnapshot::capture(&self.cache, &filters));

                let rows = self
                    .cache
                    .write_matching(&filters[0], |_, data| data.map(|d| d.without_user(id)));
                tracing::debug!(
                    snapshotted = snapshot.len(),
                    collections = rows,
                    "Applied optimistic delete"
                );
            }
        }
    }

    async fn call_gateway(&self, kind: &MutationKind) -> Result<MutationOutput, GatewayError> {
        match kind {
            MutationKind::Create { input } => {
                self.gateway.create(input).await.map(MutationOutput::Created)
            }
            MutationKind::Update { id, input } => {
                self.gateway.update(id, input).await.map(MutationOutput::Updated)
            }
            MutationKind::Delete { id } => {
                self.gateway.delete(id).await?;
                Ok(MutationOutput::Deleted(id.clone()))
            }
        }
    }

    /// Marks everything the mutation may have changed for refetch.
    fn commit(&self, kind: &MutationKind) {
        self.cache.invalidate(&QueryFilter::all_collections());
        if let Some(id) = kind.target() {
            self.cache.invalidate(&QueryFilter::from(QueryKey::item(id.clone())));
        }
    }

    pub async fn create_user(&self, input: UserInput) -> Result<User, MutationError> {
        let mut mutation = Mutation::create(input);
        match self.execute(&mut mutation).await? {
            MutationOutput::Created(user) => Ok(user),
            other => Err(unexpected_output(&other)),
        }
    }

    pub async fn update_user(&self, id: UserId, input: UserInput) -> Result<User, MutationError> {
        let mut mutation = Mutation::update(id, input);
        match self.execute(&mut mutation).await? {
            MutationOutput::Updated(user) => Ok(user),
            other => Err(unexpected_output(&other)),
        }
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), MutationError> {
        let mut mutation = Mutation::delete(id);
        self.execute(&mut mutation).await.map(|_| ())
    }
}

fn unexpected_output(output: &MutationOutput) -> MutationError {
    MutationError::Gateway(GatewayError::Unknown {
        message: format!("Unexpected mutation result: {:?}", output),
        status: None,
    })
}
