//! Login form.

use std::sync::Arc;

use crate::cache::{EntityCache, QueryFilter};
use crate::gateway::{AuthGateway, ErrorKind, GatewayError};
use crate::session::{unix_now, Credentials, Session, SessionStore};
use crate::ui::mvi::{dispatch_mvi, Intent, Reducer, UiState};
use crate::ui::notify::Notifier;

const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    Submitting {
        email: String,
    },
    Failed {
        email: String,
        message: String,
    },
    SignedIn,
}

impl UiState for LoginState {}

#[derive(Debug, Clone)]
pub enum LoginIntent {
    Submitted { email: String },
    Succeeded,
    Failed { message: String },
    Reset,
}

impl Intent for LoginIntent {}

pub struct LoginReducer;

impl Reducer for LoginReducer {
    type State = LoginState;
    type Intent = LoginIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match (state, intent) {
            (_, LoginIntent::Submitted { email }) => LoginState::Submitting { email },
            (LoginState::Submitting { .. }, LoginIntent::Succeeded) => LoginState::SignedIn,
            (LoginState::Submitting { email }, LoginIntent::Failed { message }) => {
                LoginState::Failed { email, message }
            }
            (_, LoginIntent::Reset) => LoginState::Idle,
            (state, _) => state,
        }
    }
}

/// Exchanges credentials for a session.
///
/// Every successful sign-in marks the whole cache stale, whatever ended
/// the previous session.
pub struct LoginView {
    auth: Arc<dyn AuthGateway>,
    session: SessionStore,
    cache: EntityCache,
    notifier: Notifier,
    state: LoginState,
}

impl LoginView {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        session: SessionStore,
        cache: EntityCache,
        notifier: Notifier,
    ) -> Self {
        Self {
            auth,
            session,
            cache,
            notifier,
            state: LoginState::default(),
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    fn dispatch(&mut self, intent: LoginIntent) {
        dispatch_mvi!(self, state, LoginReducer, intent);
    }

    pub async fn submit(&mut self, credentials: Credentials) -> Result<(), GatewayError> {
        self.dispatch(LoginIntent::Submitted {
            email: credentials.email.clone(),
        });

        let result = match self.auth.login(&credentials).await {
            Ok(grant) => {
                let session = Session::from_grant(grant.access_token, grant.expires_in, unix_now());
                self.session.sign_in(session).map_err(|err| {
                    GatewayError::new(
                        ErrorKind::Unknown,
                        format!("Logged in but failed to store the session: {}", err),
                    )
                })
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => {
                let stale = self.cache.invalidate(&QueryFilter::All);
                tracing::debug!(stale, "Signed in, cached data marked stale");
                self.notifier.success(LOGIN_SUCCESS_MESSAGE);
                self.dispatch(LoginIntent::Succeeded);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error_type = err.error_type(), error = %err, "Login failed");
                self.notifier.error(err.message());
                self.dispatch(LoginIntent::Failed {
                    message: err.message().to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn reset(&mut self) {
        self.dispatch(LoginIntent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_email() {
        let state = LoginReducer::reduce(
            LoginState::Idle,
            LoginIntent::Submitted {
                email: "a@b.io".to_string(),
            },
        );
        let state = LoginReducer::reduce(
            state,
            LoginIntent::Failed {
                message: "Invalid Credentials!".to_string(),
            },
        );
        assert_eq!(
            state,
            LoginState::Failed {
                email: "a@b.io".to_string(),
                message: "Invalid Credentials!".to_string(),
            }
        );
    }

    #[test]
    fn stray_success_is_ignored() {
        let state = LoginReducer::reduce(LoginState::Idle, LoginIntent::Succeeded);
        assert_eq!(state, LoginState::Idle);
    }
}
