//! User records and the input accepted by create/update.

mod user;
mod validate;

pub use user::{ParseStatusError, User, UserId, UserInput, UserStatus};
pub use validate::{is_iso_date_shape, is_valid_email, Field, FieldError};
