use tokio::time::Instant;

use crate::gateway::GatewayError;
use crate::model::{User, UserId, UserInput};

/// Value held by a cache slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheData {
    Users(Vec<User>),
    User(User),
}

impl CacheData {
    pub fn users(&self) -> Option<&[User]> {
        match self {
            Self::Users(users) => Some(users),
            Self::User(_) => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Users(_) => None,
        }
    }

    /// Applies `input` to the user with `id`, wherever it appears.
    pub fn with_update(&self, id: &UserId, input: &UserInput) -> CacheData {
        match self {
            Self::User(user) if &user.id == id => Self::User(user.with_input(input)),
            Self::User(user) => Self::User(user.clone()),
            Self::Users(users) => Self::Users(
                users
                    .iter()
                    .map(|user| {
                        if &user.id == id {
                            user.with_input(input)
                        } else {
                            user.clone()
                        }
                    })
                    .collect(),
            ),
        }
    }

    /// Drops the row with `id` from a list; single users are left alone.
    pub fn without_user(&self, id: &UserId) -> CacheData {
        match self {
            Self::Users(users) => {
                Self::Users(users.iter().filter(|u| &u.id != id).cloned().collect())
            }
            Self::User(user) => Self::User(user.clone()),
        }
    }
}

/// Fetch lifecycle of a slot. Optimistic writes never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Point-in-time view of one cache slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheEntry {
    /// Last known value; kept through errors and refetches.
    pub data: Option<CacheData>,
    pub status: FetchStatus,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<GatewayError>,
    pub fetched_at: Option<Instant>,
    /// `fetched_at + stale_time` for the key's kind.
    pub stale_after: Option<Instant>,
    /// Set by `invalidate`, cleared by the next successful fetch.
    pub invalidated: bool,
}

impl CacheEntry {
    /// Whether a read at `now` must go to the network.
    pub fn is_stale(&self, now: Instant) -> bool {
        self.invalidated || self.stale_after.map_or(true, |deadline| now >= deadline)
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn users(&self) -> Option<&[User]> {
        self.data.as_ref().and_then(CacheData::users)
    }

    pub fn user(&self) -> Option<&User> {
        self.data.as_ref().and_then(CacheData::user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserStatus;
    use std::time::Duration;

    fn user(id: &str, status: UserStatus) -> User {
        User {
            id: UserId::new(id),
            first_name: format!("User {}", id),
            last_name: None,
            email: format!("u{}@example.com", id),
            status,
            date_of_birth: "1990-01-01".to_string(),
        }
    }

    #[test]
    fn update_touches_only_matching_rows() {
        let data = CacheData::Users(vec![
            user("1", UserStatus::Active),
            user("42", UserStatus::Active),
        ]);
        let mut input = UserInput::from(&user("42", UserStatus::Active));
        input.status = UserStatus::Locked;

        let updated = data.with_update(&UserId::new("42"), &input);
        let users = updated.users().unwrap();
        assert_eq!(users[0].status, UserStatus::Active);
        assert_eq!(users[1].status, UserStatus::Locked);
        assert_eq!(users[1].id.as_str(), "42");
    }

    #[test]
    fn removal_keeps_order() {
        let data = CacheData::Users(vec![
            user("1", UserStatus::Active),
            user("7", UserStatus::Active),
            user("9", UserStatus::Locked),
        ]);
        let ids: Vec<String> = data
            .without_user(&UserId::new("7"))
            .users()
            .unwrap()
            .iter()
            .map(|u| u.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "9"]);
    }

    #[test]
    fn staleness() {
        let now = Instant::now();
        let mut entry = CacheEntry::default();
        assert!(entry.is_stale(now));

        entry.fetched_at = Some(now);
        entry.stale_after = Some(now + Duration::from_secs(30));
        assert!(!entry.is_stale(now + Duration::from_secs(29)));
        assert!(entry.is_stale(now + Duration::from_secs(30)));

        entry.invalidated = true;
        assert!(entry.is_stale(now));
    }
}
