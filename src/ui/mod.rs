//! Views over the cache and the mutation coordinator.
//!
//! Each view is a state/intent/reducer triple plus a binding that owns
//! its cache subscription. Views hold no source of truth of their own:
//! rows and records always come from the cache.

pub mod delete;
pub mod drafts;
pub mod editor;
pub mod list;
pub mod login;
pub mod mvi;
pub mod notify;
pub mod route;
