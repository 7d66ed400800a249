use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    blacklist::TokenBlacklist,
    password::{hash_password, verify_password},
    repo::{EmailTaken, UserStore},
    repo_types::{Role, Status, User},
};
use crate::{
    error::{ServiceError, ServiceResult},
    storage::AssetStore,
};

/// Validated registration data.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

/// Editable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileEdit {
    pub first_name: String,
    pub last_name: String,
    pub country_code: String,
    pub phone_number: String,
}

pub struct Avatar {
    pub body: Bytes,
    pub content_type: String,
}

/// Registration, login, logout and profile management.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    assets: Arc<dyn AssetStore>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            users,
            blacklist,
            assets,
        }
    }

    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> ServiceResult<User> {
        let existing = self
            .users
            .get_by_email(&new_user.email)
            .await
            .context("look up email")
            .map_err(ServiceError::Dependency)?;
        if existing.is_some() {
            warn!("email already registered");
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = hash_password(&new_user.password)
            .context("hash password")
            .map_err(ServiceError::Dependency)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            image_url: None,
            country_code: new_user.country_code,
            phone_number: new_user.phone_number,
            email: new_user.email,
            password_hash,
            role: Role::Regular,
            status: Status::Active,
            created_at: now,
            updated_at: now,
            last_login: now,
        };

        // A concurrent registration can slip past the lookup above; the store's
        // uniqueness check is the final word.
        if let Err(e) = self.users.create(&user).await {
            if e.downcast_ref::<EmailTaken>().is_some() {
                warn!("email registered concurrently");
                return Err(ServiceError::DuplicateEmail);
            }
            return Err(ServiceError::Dependency(e.context("create user")));
        }

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<User> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .context("look up email")
            .map_err(ServiceError::Dependency)?
            .ok_or(ServiceError::NotFound("user"))?;

        let ok = verify_password(password, &user.password_hash)
            .context("verify password")
            .map_err(ServiceError::Dependency)?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ServiceError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        Ok(user)
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.blacklist
            .add(token)
            .await
            .context("add token to blacklist")
            .map_err(ServiceError::Dependency)?;
        info!("token blacklisted");
        Ok(())
    }

    pub async fn is_revoked(&self, token: &str) -> ServiceResult<bool> {
        self.blacklist
            .is_blacklisted(token)
            .await
            .context("check token blacklist")
            .map_err(ServiceError::Dependency)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .get_by_id(user_id)
            .await
            .context("fetch user")
            .map_err(ServiceError::Dependency)?
            .ok_or(ServiceError::NotFound("user"))
    }

    /// Text fields are committed before the avatar upload; an upload failure
    /// leaves them changed.
    #[instrument(skip(self, edit, avatar), fields(has_avatar = avatar.is_some()))]
    pub async fn edit_profile(
        &self,
        user_id: Uuid,
        edit: ProfileEdit,
        avatar: Option<Avatar>,
    ) -> ServiceResult<()> {
        let mut user = self.profile(user_id).await?;

        user.first_name = edit.first_name;
        user.last_name = edit.last_name;
        user.country_code = edit.country_code;
        user.phone_number = edit.phone_number;
        user.updated_at = OffsetDateTime::now_utc();
        self.users
            .update(&user)
            .await
            .context("update user profile")
            .map_err(ServiceError::Dependency)?;

        let Some(avatar) = avatar else {
            info!("profile updated");
            return Ok(());
        };

        let url = self
            .assets
            .save_avatar(user_id, avatar.body, &avatar.content_type)
            .await
            .context("upload avatar")
            .map_err(ServiceError::Dependency)?;

        user.image_url = Some(url);
        user.updated_at = OffsetDateTime::now_utc();
        self.users
            .update(&user)
            .await
            .context("update user avatar url")
            .map_err(ServiceError::Dependency)?;

        info!("profile and avatar updated");
        Ok(())
    }
}
