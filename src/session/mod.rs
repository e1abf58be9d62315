//! Authentication state shared by the gateway and the console.

mod credentials;
mod store;

pub use credentials::{AccessToken, Credentials};
pub use store::{unix_now, Session, SessionError, SessionEvent, SessionStore};
