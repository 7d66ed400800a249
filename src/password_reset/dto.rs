use serde::Deserialize;
use validator::Validate;

use crate::{
    error::ServiceError,
    validation::{strong_password, EMAIL_RE},
};

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(regex(path = *EMAIL_RE, message = "must be a valid email"))]
    pub email: String,
}

impl ResetPasswordRequest {
    pub fn into_valid(mut self) -> Result<Self, ServiceError> {
        self.email = self.email.trim().to_lowercase();
        self.validate()?;
        Ok(self)
    }
}

/// Query string of the link sent by email.
#[derive(Debug, Deserialize)]
pub struct ResetLinkQuery {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(custom(function = "strong_password"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "must match 'password'"))]
    pub re_password: String,
}

impl ChangePasswordRequest {
    /// Returns the new password once both entries agree and meet the policy.
    pub fn into_valid(self) -> Result<String, ServiceError> {
        self.validate()?;
        Ok(self.password)
    }
}
