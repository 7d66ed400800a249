use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{User, UserRow};
use crate::db::is_unique_violation;

/// Returned (inside `anyhow::Error`) by [`UserStore::create`] when the email is taken.
#[derive(Debug, thiserror::Error)]
#[error("user with email {0} already exists")]
pub struct EmailTaken(pub String);

/// Persistence of user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> anyhow::Result<()>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Returns `false` when no account has this email.
    async fn update_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<bool>;
    async fn update(&self, user: &User) -> anyhow::Result<()>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, image_url, country_code, phone_number, \
     email, password_hash, role, status, created_at, updated_at, last_login";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> anyhow::Result<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (
                id, first_name, last_name, image_url, country_code, phone_number,
                email, password_hash, role, status, created_at, updated_at, last_login
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.image_url)
        .bind(&user.country_code)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login)
        .execute(&self.db)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(EmailTaken(user.email.clone()).into()),
            Err(e) => Err(e).context("insert user"),
        }
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("query user by id")?;
        row.map(User::try_from).transpose()
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("query user by email")?;
        row.map(User::try_from).transpose()
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $2, updated_at = now()
             WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.db)
        .await
        .context("update password hash")?;
        Ok(res.rows_affected() > 0)
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
               SET first_name = $2, last_name = $3, image_url = $4, country_code = $5,
                   phone_number = $6, role = $7, status = $8, updated_at = $9, last_login = $10
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.image_url)
        .bind(&user.country_code)
        .bind(&user.phone_number)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.updated_at)
        .bind(user.last_login)
        .execute(&self.db)
        .await
        .context("update user")?;
        Ok(())
    }
}
