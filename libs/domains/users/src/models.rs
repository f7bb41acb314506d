use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

pub const NAME_BLANK: &str = "Name can not be blank.";
pub const NAME_TOO_LONG: &str = "Name must be at most 100 characters.";
pub const EMAIL_BLANK: &str = "Email can not be blank.";
pub const EMAIL_INVALID: &str = "Email is not a valid email address.";
pub const EMAIL_TOO_LONG: &str = "Email must be at most 255 characters.";
pub const EMAIL_TAKEN: &str = "Email has already been taken.";

const BLANK: &str = "blank";

fn name_present(name: &str) -> Result<(), ValidationError> {
    present(name, NAME_BLANK)
}

fn email_present(email: &str) -> Result<(), ValidationError> {
    present(email, EMAIL_BLANK)
}

fn present(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(BLANK).with_message(message.into()));
    }
    Ok(())
}

/// A user record.
///
/// `id` and the timestamps belong to the store: they are `None` on a blank
/// instance and filled in by `validate_and_create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Option<Uuid>,
    #[validate(
        custom(function = "name_present"),
        length(max = 100, message = "Name must be at most 100 characters.")
    )]
    pub name: String,
    #[validate(
        custom(function = "email_present"),
        email(message = "Email is not a valid email address."),
        length(max = 255, message = "Email must be at most 255 characters.")
    )]
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Field-level checks. Uniqueness of `email` needs the store and is
    /// added there.
    pub fn validate_fields(&self) -> ValidationErrorSet {
        match self.validate() {
            Ok(()) => ValidationErrorSet::new(),
            Err(errors) => errors.into(),
        }
    }

    /// Copy the fields present in `params` onto this user.
    pub fn apply(&mut self, params: UserParams) {
        if let Some(name) = params.name {
            self.name = name;
        }
        if let Some(email) = params.email {
            self.email = email;
        }
    }

    /// Emails compare case-insensitively and ignore surrounding whitespace.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Request body for create and update. Fields that are absent leave the
/// target untouched; unknown fields such as `_method` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserParams {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UserParams> for User {
    fn from(params: UserParams) -> Self {
        let mut user = User::default();
        user.apply(params);
        user
    }
}

/// Field name → messages. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrorSet {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let messages = self.errors.entry(field.into()).or_default();
        let message = message.into();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn has_any(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Number of messages across all fields.
    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl From<ValidationErrors> for ValidationErrorSet {
    /// A blank field reports only that it is blank.
    fn from(errors: ValidationErrors) -> Self {
        let mut set = ValidationErrorSet::new();

        for (field, field_errors) in errors.field_errors() {
            let blank = field_errors.iter().find(|e| e.code == BLANK);
            let relevant: Vec<&ValidationError> = match blank {
                Some(blank) => vec![blank],
                None => field_errors.iter().collect(),
            };

            for error in relevant {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid.", field));
                set.add(field.to_string(), message);
            }
        }

        set
    }
}
