//! In-memory user API with call counters, failure injection and a gate
//! that holds calls until the test releases them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use user_console::gateway::{AuthGateway, ErrorKind, GatewayError, LoginGrant, UserGateway};
use user_console::model::{User, UserId, UserInput};
use user_console::session::{AccessToken, Credentials};

pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
    Login,
}

#[derive(Default)]
struct FakeState {
    users: Vec<User>,
    next_id: u64,
    calls: HashMap<Op, usize>,
    failures: VecDeque<(Op, GatewayError)>,
    searches: Vec<Option<String>>,
}

pub struct FakeGateway {
    state: Mutex<FakeState>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeGateway {
    pub fn with_users(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                users,
                next_id: 100,
                ..FakeState::default()
            }),
            gate: Mutex::new(None),
        })
    }

    /// The next call of `op` fails with `error` (queued, in order).
    pub fn fail_next(&self, op: Op, error: GatewayError) {
        self.state.lock().failures.push_back((op, error));
    }

    pub fn fail_next_with(&self, op: Op, kind: ErrorKind) {
        self.fail_next(op, GatewayError::of_kind(kind));
    }

    pub fn calls(&self, op: Op) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn searches(&self) -> Vec<Option<String>> {
        self.state.lock().searches.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.lock().users.clone()
    }

    /// Changes server-side data without going through the API.
    pub fn set_users(&self, users: Vec<User>) {
        self.state.lock().users = users;
    }

    /// From now on every call waits for a permit on the returned gate.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Counts the call, then waits at the gate if one is installed.
    async fn enter(&self, op: Op) {
        *self.state.lock().calls.entry(op).or_default() += 1;
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }

    fn injected_failure(&self, op: Op) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        match state.failures.iter().position(|(o, _)| *o == op) {
            Some(index) => Err(state.failures.remove(index).expect("index in range").1),
            None => Ok(()),
        }
    }
}

fn not_found() -> GatewayError {
    GatewayError::of_kind(ErrorKind::NotFound)
}

fn matches_search(user: &User, term: &str) -> bool {
    let term = term.to_lowercase();
    user.full_name().to_lowercase().contains(&term) || user.email.to_lowercase().contains(&term)
}

#[async_trait]
impl UserGateway for FakeGateway {
    async fn list(&self, search: Option<&str>) -> Result<Vec<User>, GatewayError> {
        // Answer with the data as it was when the request was sent.
        let users: Vec<User> = {
            let mut state = self.state.lock();
            state.searches.push(search.map(str::to_string));
            state
                .users
                .iter()
                .filter(|u| search.map_or(true, |term| matches_search(u, term)))
                .cloned()
                .collect()
        };
        self.enter(Op::List).await;
        self.injected_failure(Op::List)?;
        Ok(users)
    }

    async fn get(&self, id: &UserId) -> Result<User, GatewayError> {
        let user = self.state.lock().users.iter().find(|u| &u.id == id).cloned();
        self.enter(Op::Get).await;
        self.injected_failure(Op::Get)?;
        user.ok_or_else(not_found)
    }

    async fn create(&self, input: &UserInput) -> Result<User, GatewayError> {
        self.enter(Op::Create).await;
        self.injected_failure(Op::Create)?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let template = User {
            id: UserId::new(state.next_id.to_string()),
            first_name: String::new(),
            last_name: None,
            email: String::new(),
            status: input.status,
            date_of_birth: String::new(),
        };
        let user = template.with_input(input);
        state.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: &UserId, input: &UserInput) -> Result<User, GatewayError> {
        self.enter(Op::Update).await;
        self.injected_failure(Op::Update)?;
        let mut state = self.state.lock();
        let user = state
            .users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(not_found)?;
        *user = user.with_input(input);
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), GatewayError> {
        self.enter(Op::Delete).await;
        self.injected_failure(Op::Delete)?;
        let mut state = self.state.lock();
        let before = state.users.len();
        state.users.retain(|u| &u.id != id);
        if state.users.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, GatewayError> {
        self.enter(Op::Login).await;
        self.injected_failure(Op::Login)?;
        if credentials.password != PASSWORD {
            return Err(GatewayError::new(ErrorKind::Unauthorized, "Invalid Credentials!"));
        }
        Ok(LoginGrant {
            access_token: AccessToken::new(format!("token-{}", credentials.email)),
            expires_in: 3600,
            message: Some("Login successful".to_string()),
        })
    }
}
