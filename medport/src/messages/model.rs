use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::Error;

/// Review status of a message. Moves forward only: new, read, archived.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    Read,
    Archived,
}

impl Status {
    /// Can a message in this status be moved to `next`? Staying put is allowed.
    pub fn can_transition_to(&self, next: Status) -> bool {
        next >= *self
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Read => "read",
            Status::Archived => "archived",
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Status::New),
            "read" => Ok(Status::Read),
            "archived" => Ok(Status::Archived),
            _ => Err(Error::InvalidStatus),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contact-form submission as stored and shown to admins.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContactMessage {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: Status,
}

impl ContactMessage {
    /// New message from a validated form.
    pub fn new(id: Uuid, timestamp: OffsetDateTime, form: ContactForm) -> Self {
        Self {
            id,
            timestamp,
            name: form.name,
            email: form.email,
            phone: form.phone,
            company: form.company,
            subject: form.subject,
            message: form.message,
            status: Status::New,
        }
    }
}

/// Validated contact form fields, trimmed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validate a submitted JSON document.
    ///
    /// `name`, `email` and `message` must be non-blank strings. Optional fields that are
    /// missing or not strings are stored empty. Other fields are ignored.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        let object = value.as_object().ok_or(Error::MissingFields)?;

        let required = |name: &str| -> Result<String, Error> {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
                .ok_or(Error::MissingFields)
        };

        let optional = |name: &str| -> String {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        };

        Ok(Self {
            name: required("name")?,
            email: required("email")?,
            message: required("message")?,
            phone: optional("phone"),
            company: optional("company"),
            subject: optional("subject"),
        })
    }
}
