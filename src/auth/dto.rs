use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use super::repo_types::{Role, Status, User};
use super::services::{NewUser, ProfileEdit};
use crate::{
    error::ServiceError,
    validation::{strong_password, EMAIL_RE},
};

/// Request body for user registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub country_code: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone_number: String,
    #[validate(regex(path = *EMAIL_RE, message = "must be a valid email"))]
    pub email: String,
    #[validate(custom(function = "strong_password"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn into_valid(mut self) -> Result<NewUser, ServiceError> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.country_code = self.country_code.trim().to_string();
        self.phone_number = self.phone_number.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.validate()?;
        Ok(NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            country_code: self.country_code,
            phone_number: self.phone_number,
            email: self.email,
            password: self.password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(regex(path = *EMAIL_RE, message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn into_valid(mut self) -> Result<Self, ServiceError> {
        self.email = self.email.trim().to_lowercase();
        self.validate()?;
        Ok(self)
    }
}

/// Returned after login or register.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Text fields of a profile edit; the avatar travels as a separate multipart part.
#[derive(Debug, Default, Validate)]
pub struct ProfileEditRequest {
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 10, message = "must be between 1 and 10 characters"))]
    pub country_code: String,
    #[validate(length(min = 1, message = "is required"))]
    pub phone_number: String,
}

impl ProfileEditRequest {
    pub fn set(&mut self, field: &str, value: String) {
        let value = value.trim().to_string();
        match field {
            "first_name" => self.first_name = value,
            "last_name" => self.last_name = value,
            "country_code" => self.country_code = value,
            "phone_number" => self.phone_number = value,
            _ => {}
        }
    }

    pub fn into_valid(self) -> Result<ProfileEdit, ServiceError> {
        self.validate()?;
        Ok(ProfileEdit {
            first_name: self.first_name,
            last_name: self.last_name,
            country_code: self.country_code,
            phone_number: self.phone_number,
        })
    }
}

/// Public part of the user returned to its owner.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub image_url: Option<String>,
    pub country_code: String,
    pub phone_number: String,
    pub email: String,
    pub role: Role,
    pub status: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            image_url: u.image_url,
            country_code: u.country_code,
            phone_number: u.phone_number,
            email: u.email,
            role: u.role,
            status: u.status,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            country_code: "+90".into(),
            phone_number: "5551234567".into(),
            email: "  Ada@Example.COM ".into(),
            password: "Engine42x".into(),
        }
    }

    #[test]
    fn register_normalizes_email() {
        let new_user = register_request().into_valid().expect("valid");
        assert_eq!(new_user.email, "ada@example.com");
    }

    #[test]
    fn register_reports_all_violations() {
        let mut req = register_request();
        req.first_name = "A".into();
        req.password = "weak".into();
        req.email = "nope".into();
        match req.into_valid().unwrap_err() {
            ServiceError::Validation(msgs) => assert_eq!(
                msgs,
                vec![
                    "Field 'email' must be a valid email".to_string(),
                    "Field 'first_name' must be between 2 and 50 characters".to_string(),
                    "Field 'password' must be 8-48 characters with upper and lower case letters and a digit"
                        .to_string(),
                ]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn profile_response_hides_hash() {
        let user = crate::testing::sample_user("ada@example.com");
        let json = serde_json::to_value(ProfileResponse::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn profile_edit_ignores_unknown_fields() {
        let mut req = ProfileEditRequest::default();
        req.set("first_name", "Grace".into());
        req.set("last_name", "Hopper".into());
        req.set("country_code", "+1".into());
        req.set("phone_number", "5550000".into());
        req.set("email", "hijack@example.com".into());
        let edit = req.into_valid().expect("valid");
        assert_eq!(edit.first_name, "Grace");
    }

    #[test]
    fn profile_edit_trims_before_length_check() {
        let mut req = ProfileEditRequest::default();
        req.set("first_name", "  G  ".into());
        req.set("last_name", "Hopper".into());
        req.set("country_code", "+1".into());
        req.set("phone_number", " ".into());
        match req.into_valid().unwrap_err() {
            ServiceError::Validation(msgs) => assert_eq!(
                msgs,
                vec![
                    "Field 'first_name' must be between 2 and 50 characters".to_string(),
                    "Field 'phone_number' is required".to_string(),
                ]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }
}
