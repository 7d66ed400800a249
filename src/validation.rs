//! Shared request rules for `#[derive(Validate)]` DTOs, and the conversion
//! of a failed run into a single `ServiceError::Validation` that lists every
//! violated field at once.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

use crate::error::ServiceError;

lazy_static! {
    pub static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

fn rejected(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

/// 8 to 48 characters with at least one lowercase, one uppercase and one digit.
pub fn strong_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    let ok = (8..=48).contains(&len)
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(rejected(
            "strong_password",
            "must be 8-48 characters with upper and lower case letters and a digit".into(),
        ))
    }
}

pub fn one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(rejected("one_of", format!("must be one of: {}", allowed.join(", "))))
    }
}

/// Rule messages are predicates; each is prefixed with its field name.
impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(m) => format!("Field '{field}' {m}"),
                    None => format!("Field '{field}' is invalid"),
                })
            })
            .collect();
        messages.sort();
        ServiceError::Validation(messages)
    }
}
