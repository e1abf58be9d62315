use crate::cache::{FetchStatus, QueryKey};
use crate::gateway::GatewayError;
use crate::model::{User, UserId};
use crate::ui::mvi::UiState;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserListState {
    pub search: Option<String>,
    pub users: Vec<User>,
    pub status: FetchStatus,
    /// Last fetch error; rows stay visible next to it.
    pub error: Option<GatewayError>,
    /// Shown rows are known to be outdated and a refetch is due.
    pub stale: bool,
}

impl UiState for UserListState {}

impl UserListState {
    /// Cache key the view currently shows.
    pub fn key(&self) -> QueryKey {
        QueryKey::collection(self.search.as_deref())
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn find(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == id)
    }
}
