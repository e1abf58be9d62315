//! Route guard: everything except login needs a live session.

use crate::model::UserId;
use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Users,
    NewUser,
    EditUser(UserId),
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

/// The route to actually show for a request to `requested`.
pub fn guard(requested: Route, session: &SessionStore) -> Route {
    if requested.requires_auth() && !session.is_authenticated() {
        tracing::debug!(?requested, "Not signed in, redirecting to login");
        return Route::Login;
    }
    requested
}
