use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing::{info, instrument, warn};

use super::repo::ResetCodeStore;
use crate::{
    auth::{
        password::{generate_reset_code, hash_password},
        repo::UserStore,
    },
    config::ResetConfig,
    error::{ServiceError, ServiceResult},
    mail::MailSender,
};

pub const RESET_SUBJECT: &str = "Password Reset Request";

#[derive(Debug, Clone)]
pub struct ResetSettings {
    pub link_base: String,
    pub code_ttl: Duration,
}

impl From<&ResetConfig> for ResetSettings {
    fn from(cfg: &ResetConfig) -> Self {
        Self {
            link_base: cfg.link_base.trim_end_matches('/').to_string(),
            code_ttl: cfg.code_ttl(),
        }
    }
}

impl ResetSettings {
    pub fn reset_link(&self, code: &str, email: &str) -> String {
        format!(
            "{}/reset-password?token={}&email={}",
            self.link_base,
            urlencoding::encode(code),
            urlencoding::encode(email)
        )
    }

    fn ttl_phrase(&self) -> String {
        let hours = self.code_ttl.as_secs() / 3600;
        if hours >= 24 && hours % 24 == 0 {
            format!("{} days", hours / 24)
        } else {
            format!("{} hours", hours.max(1))
        }
    }

    pub fn email_body(&self, link: &str) -> String {
        format!(
            "Dear User,\n\
             We received a request to reset the password associated with your account. \
             If you made this request, please click the link below to reset your password:\n\n\
             {link}\n\n\
             This link will expire in {}. If you did not request a password reset, \
             you can safely ignore this email.\n\n\
             Best regards,\n\
             Carwise Team",
            self.ttl_phrase()
        )
    }
}

/// Email-verified password reset.
pub struct PasswordResetService {
    users: Arc<dyn UserStore>,
    codes: Arc<dyn ResetCodeStore>,
    mailer: Arc<dyn MailSender>,
    settings: ResetSettings,
}

impl PasswordResetService {
    pub fn new(
        users: Arc<dyn UserStore>,
        codes: Arc<dyn ResetCodeStore>,
        mailer: Arc<dyn MailSender>,
        settings: ResetSettings,
    ) -> Self {
        Self {
            users,
            codes,
            mailer,
            settings,
        }
    }

    /// Issues a fresh code (replacing any earlier one) and mails the reset link.
    ///
    /// A failed save is logged and the mail still goes out; a failed delivery
    /// is returned to the caller.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> ServiceResult<()> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .context("look up email")
            .map_err(ServiceError::Dependency)?;
        if user.is_none() {
            return Err(ServiceError::NotFound("account"));
        }

        let code = generate_reset_code();
        if let Err(e) = self.codes.save(email, &code, self.settings.code_ttl).await {
            warn!(error = %e, "failed to save reset code");
        }

        let link = self.settings.reset_link(&code, email);
        self.mailer
            .send(email, RESET_SUBJECT, &self.settings.email_body(&link))
            .await
            .context("send password reset email")
            .map_err(ServiceError::Dependency)?;

        info!("password reset email sent");
        Ok(())
    }

    /// Consumes `code`, then sets the new password. The code is gone once
    /// this returns past the check, even if the update itself fails.
    #[instrument(skip(self, code, new_password))]
    pub async fn change_password(&self, email: &str, code: &str, new_password: &str) -> ServiceResult<()> {
        let consumed = self
            .codes
            .consume(email, code)
            .await
            .context("consume reset code")
            .map_err(ServiceError::Dependency)?;
        if !consumed {
            warn!("invalid or expired reset code");
            return Err(ServiceError::InvalidOrExpiredCode);
        }

        let password_hash = hash_password(new_password)
            .context("hash password")
            .map_err(ServiceError::Dependency)?;

        let updated = self
            .users
            .update_password_hash(email, &password_hash)
            .await
            .context("update password")
            .map_err(ServiceError::Dependency)?;
        if !updated {
            return Err(ServiceError::NotFound("account"));
        }

        info!("password changed");
        Ok(())
    }
}
