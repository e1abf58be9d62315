//! Create/edit form for one user.
//!
//! The form loads through the cache, validates locally on submit, and
//! saves through the mutation coordinator. Unsaved input is kept as a
//! local draft until it is saved or discarded.

mod form;
mod intent;
mod reducer;
mod state;
mod view;

pub use form::UserForm;
pub use intent::EditorIntent;
pub use reducer::EditorReducer;
pub use state::{EditorMode, EditorState, EditorStatus};
pub use view::{SubmitOutcome, UserEditor};
