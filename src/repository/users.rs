//! User domain methods on Repository

use rust_decimal::Decimal;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        member::Member,
        user::{NewUser, UpdateAccess, User, UserRow, UserShort},
    },
};

const USER_COLUMNS: &str = r#"
    id, username, first_name, last_name, email, password,
    is_superuser, groups, permissions, created_at, updated_at
"#;

pub(crate) fn duplicate_username() -> AppError {
    AppError::field("username", "duplicate", "A user with that username already exists.")
}

impl Repository {
    /// Get user by ID
    pub async fn users_get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user by username
    pub async fn users_get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Check if a username is taken, optionally ignoring one user
    pub async fn users_username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != $2)")
                .bind(username)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Short list of every user, for choice fields
    pub async fn users_list_short(&self) -> AppResult<Vec<UserShort>> {
        let rows = sqlx::query_as::<_, UserShort>(
            "SELECT id, username, first_name, last_name, email FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Register a user together with its member row
    pub async fn users_register(&self, user: &NewUser, outstanding_debt: Decimal) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (username, first_name, last_name, email, password, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_superuser)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::unique(e, duplicate_username()))?;

        let member_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO members (user_id, outstanding_debt) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(outstanding_debt)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.members_get_by_id(member_id).await
    }

    /// Replace a user's groups, permissions and superuser flag
    pub async fn users_update_access(&self, id: i32, access: &UpdateAccess) -> AppResult<User> {
        let groups: Vec<String> = access.groups.iter().map(|g| g.as_str().to_string()).collect();
        let permissions: Vec<String> = access.permissions.iter().map(|p| p.as_str().to_string()).collect();

        sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET is_superuser = $2, groups = $3, permissions = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(access.is_superuser)
        .bind(&groups)
        .bind(&permissions)
        .fetch_optional(&self.pool)
        .await?
        .map(User::from)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }
}
