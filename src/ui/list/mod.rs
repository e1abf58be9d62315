//! User list view.
//!
//! - `state.rs` - rows, fetch status, error panel, search term
//! - `intent.rs` - search changes and cache entry changes
//! - `reducer.rs` - pure transitions
//! - `view.rs` - binding to the cache

mod intent;
mod reducer;
mod state;
mod view;

pub use intent::ListIntent;
pub use reducer::ListReducer;
pub use state::UserListState;
pub use view::UserListView;
