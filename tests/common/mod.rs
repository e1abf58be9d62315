//! Shared test utilities and fakes.

#![allow(dead_code, unused_imports)]

pub mod fake_gateway;
pub mod mock_api;

use std::sync::Arc;

use user_console::app::AppContext;
use user_console::cache::{CachePolicy, EntityCache};
use user_console::config::Config;
use user_console::model::{User, UserId, UserStatus};
use user_console::mutation::MutationCoordinator;
use user_console::queries::UserQueries;
use user_console::session::{unix_now, AccessToken, Session, SessionStore};
use user_console::ui::drafts::DraftStore;

pub use fake_gateway::{FakeGateway, Op, PASSWORD};

pub fn user(id: &str, first: &str, last: &str, status: UserStatus) -> User {
    User {
        id: UserId::new(id),
        first_name: first.to_string(),
        last_name: (!last.is_empty()).then(|| last.to_string()),
        email: format!("{}@example.com", first.to_lowercase()),
        status,
        date_of_birth: "1990-01-01".to_string(),
    }
}

/// Rows 1, 7, 42: Ada Lovelace, Grace Hopper, Alan Turing.
pub fn sample_users() -> Vec<User> {
    vec![
        user("1", "Ada", "Lovelace", UserStatus::Active),
        user("7", "Grace", "Hopper", UserStatus::Active),
        user("42", "Alan", "Turing", UserStatus::Active),
    ]
}

pub fn ids(users: &[User]) -> Vec<&str> {
    users.iter().map(|u| u.id.as_str()).collect()
}

pub fn signed_in_session() -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .sign_in(Session::from_grant(AccessToken::new("test-token"), 3600, unix_now()))
        .expect("in-memory sign in");
    session
}

/// Cache, queries and coordinator over one fake gateway.
pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub cache: EntityCache,
    pub queries: UserQueries,
    pub coordinator: MutationCoordinator,
}

impl Harness {
    pub fn new(users: Vec<User>) -> Self {
        Self::with_policy(users, CachePolicy::default())
    }

    pub fn with_policy(users: Vec<User>, policy: CachePolicy) -> Self {
        let gateway = FakeGateway::with_users(users);
        let cache = EntityCache::new(policy);
        Self {
            queries: UserQueries::new(cache.clone(), gateway.clone()),
            coordinator: MutationCoordinator::new(cache.clone(), gateway.clone()),
            gateway,
            cache,
        }
    }
}

/// App context over a fake gateway, signed in, drafts off.
pub fn context(gateway: Arc<FakeGateway>) -> AppContext {
    context_with(gateway, signed_in_session(), DraftStore::disabled())
}

pub fn context_with(
    gateway: Arc<FakeGateway>,
    session: SessionStore,
    drafts: DraftStore,
) -> AppContext {
    AppContext::with_gateways(Config::default(), session, gateway.clone(), gateway, drafts)
}

/// Yields until `condition` holds; panics after many rounds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
