use serde::{Deserialize, Serialize};

use crate::model::{Field, FieldError, User, UserInput, UserStatus};

/// Raw text of every form field, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
    pub date_of_birth: String,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            status: UserStatus::default().to_string(),
            date_of_birth: String::new(),
        }
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            status: user.status.to_string(),
            date_of_birth: user.date_of_birth.clone(),
        }
    }
}

impl UserForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Status => &self.status,
            Field::DateOfBirth => &self.date_of_birth,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Email => self.email = value,
            Field::Status => self.status = value,
            Field::DateOfBirth => self.date_of_birth = value,
        }
    }

    /// Parses and validates the form.
    ///
    /// Errors come back in form order. A blank last name becomes `None`.
    pub fn to_input(&self) -> Result<UserInput, Vec<FieldError>> {
        let status = self.status.trim().parse::<UserStatus>();
        let last_name = self.last_name.trim();
        let input = UserInput {
            first_name: self.first_name.trim().to_string(),
            last_name: (!last_name.is_empty()).then(|| last_name.to_string()),
            email: self.email.trim().to_string(),
            status: status.clone().unwrap_or_default(),
            date_of_birth: self.date_of_birth.trim().to_string(),
        };

        let mut errors = input.validate().err().unwrap_or_default();
        if let Err(err) = status {
            errors.push(FieldError::new(Field::Status, err.to_string()));
        }
        if errors.is_empty() {
            return Ok(input);
        }
        errors.sort_by_key(|e| Field::all().iter().position(|f| *f == e.field));
        Err(errors)
    }
}
