//! Delete confirmation.
//!
//! `Hidden -> Confirming -> Deleting -> (Hidden | Failed)`. A failed
//! delete can be confirmed again or cancelled.

mod dialog;
mod intent;
mod reducer;
mod state;

pub use dialog::{DeleteDialog, DeleteOutcome};
pub use intent::DeleteIntent;
pub use reducer::DeleteReducer;
pub use state::DeleteDialogState;
