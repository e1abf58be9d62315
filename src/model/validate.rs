//! Client-side validation of user form input.
//!
//! Mirrors the rules the API enforces so most mistakes are caught before
//! a round trip. The server remains the authority: a `Validation` error
//! from the gateway can still arrive for input that passes here.

use std::fmt;

use super::user::UserInput;

const NAME_MAX_CHARS: usize = 50;

/// Form fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Status,
    DateOfBirth,
}

impl Field {
    pub fn all() -> &'static [Field] {
        &[
            Self::FirstName,
            Self::LastName,
            Self::Email,
            Self::Status,
            Self::DateOfBirth,
        ]
    }

    /// JSON name used by the API.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Status => "status",
            Self::DateOfBirth => "dateOfBirth",
        }
    }

    /// Short key accepted by the console (`first=Ada`).
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::FirstName => "first",
            Self::LastName => "last",
            Self::Email => "email",
            Self::Status => "status",
            Self::DateOfBirth => "dob",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Status => "Status",
            Self::DateOfBirth => "Date of birth",
        }
    }

    /// Accepts the short key, the wire name, or the label, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::all().iter().copied().find(|field| {
            needle == field.short_name()
                || needle == field.wire_name().to_lowercase()
                || needle == field.label().to_lowercase()
        })
    }

    /// Finds the field a free-form server message refers to, if any.
    pub fn mentioned_in(message: &str) -> Option<Self> {
        let haystack = message.to_lowercase();
        Self::all().iter().copied().find(|field| {
            haystack.contains(&field.wire_name().to_lowercase())
                || haystack.contains(&field.label().to_lowercase())
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validation message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.short_name(), self.message)
    }
}

impl UserInput {
    /// Checks every field and returns all failures at once.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new(Field::FirstName, "First name is required"));
        } else if self.first_name.chars().count() > NAME_MAX_CHARS {
            errors.push(FieldError::new(
                Field::FirstName,
                "First name must be less than 50 characters",
            ));
        }

        if let Some(last) = &self.last_name {
            if last.chars().count() > NAME_MAX_CHARS {
                errors.push(FieldError::new(
                    Field::LastName,
                    "Last name must be less than 50 characters",
                ));
            }
        }

        if self.email.trim().is_empty() {
            errors.push(FieldError::new(Field::Email, "Email is required"));
        } else if !is_valid_email(&self.email) {
            errors.push(FieldError::new(Field::Email, "Invalid email format"));
        }

        if self.date_of_birth.is_empty() {
            errors.push(FieldError::new(
                Field::DateOfBirth,
                "Date of birth is required",
            ));
        } else if !is_iso_date_shape(&self.date_of_birth) {
            errors.push(FieldError::new(
                Field::DateOfBirth,
                "Date must be in format YYYY-MM-DD",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// `YYYY-MM-DD` digit shape; calendar correctness is left to the server.
pub fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserStatus;

    fn input() -> UserInput {
        UserInput {
            first_name: "Grace".to_string(),
            last_name: Some("Hopper".to_string()),
            email: "grace@navy.mil".to_string(),
            status: UserStatus::Active,
            date_of_birth: "1906-12-09".to_string(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let bad = UserInput {
            first_name: "  ".to_string(),
            last_name: Some("x".repeat(51)),
            email: "nope".to_string(),
            status: UserStatus::Locked,
            date_of_birth: "12/09/1906".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                Field::FirstName,
                Field::LastName,
                Field::Email,
                Field::DateOfBirth
            ]
        );
        assert_eq!(errors[0].message, "First name is required");
        assert_eq!(errors[2].message, "Invalid email format");
    }

    #[test]
    fn fifty_characters_is_allowed() {
        let mut value = input();
        value.first_name = "é".repeat(50);
        assert!(value.validate().is_ok());
        value.first_name.push('é');
        assert!(value.validate().is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("a@.io"));
    }

    #[test]
    fn date_shapes() {
        assert!(is_iso_date_shape("2000-01-31"));
        assert!(!is_iso_date_shape("2000-1-31"));
        assert!(!is_iso_date_shape("2000/01/31"));
        assert!(!is_iso_date_shape(""));
    }

    #[test]
    fn field_lookup_from_messages() {
        assert_eq!(
            Field::mentioned_in("email already exists"),
            Some(Field::Email)
        );
        assert_eq!(
            Field::mentioned_in("dateOfBirth cannot be in the future"),
            Some(Field::DateOfBirth)
        );
        assert_eq!(Field::mentioned_in("something broke"), None);
        assert_eq!(Field::parse("dob"), Some(Field::DateOfBirth));
        assert_eq!(Field::parse("firstName"), Some(Field::FirstName));
    }
}
