use crate::cache::{CacheSubscription, QueryFilter};
use crate::queries::UserQueries;
use crate::ui::mvi::dispatch_mvi;

use super::intent::ListIntent;
use super::reducer::ListReducer;
use super::state::UserListState;

/// Keeps a [`UserListState`] in step with the cache entry of its search.
pub struct UserListView {
    queries: UserQueries,
    state: UserListState,
    subscription: Option<CacheSubscription>,
}

impl UserListView {
    pub fn new(queries: UserQueries) -> Self {
        Self {
            queries,
            state: UserListState::default(),
            subscription: None,
        }
    }

    pub fn state(&self) -> &UserListState {
        &self.state
    }

    fn dispatch(&mut self, intent: ListIntent) {
        dispatch_mvi!(self, state, ListReducer, intent);
    }

    fn ensure_subscribed(&mut self) {
        let key = self.state.key();
        if self.subscription.as_ref().map(CacheSubscription::key) != Some(&key) {
            self.subscription = Some(self.queries.cache().subscribe(&key));
        }
    }

    /// Reads the current search through the cache.
    pub async fn load(&mut self) -> &UserListState {
        self.ensure_subscribed();
        let key = self.state.key();
        let entry = self.queries.users(key.search()).await;
        if let Some(subscription) = self.subscription.as_mut() {
            // Already reflected in `entry`.
            subscription.take_change();
        }
        self.dispatch(ListIntent::EntryChanged { key, entry });
        &self.state
    }

    pub async fn search(&mut self, term: Option<&str>) -> &UserListState {
        self.dispatch(ListIntent::SearchChanged {
            search: term.map(str::to_string),
        });
        self.load().await
    }

    /// Forces a refetch of the current search.
    pub async fn refresh(&mut self) -> &UserListState {
        self.queries
            .cache()
            .invalidate(&QueryFilter::from(self.state.key()));
        self.load().await
    }

    /// Applies a pending cache change, if any. Returns whether one was applied.
    pub fn sync(&mut self) -> bool {
        let change = self.subscription.as_mut().and_then(|subscription| {
            subscription
                .take_change()
                .map(|entry| (subscription.key().clone(), entry))
        });
        match change {
            Some((key, entry)) => {
                self.dispatch(ListIntent::EntryChanged { key, entry });
                true
            }
            None => false,
        }
    }
}
