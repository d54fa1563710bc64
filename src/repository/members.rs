//! Member domain methods on Repository

use rust_decimal::Decimal;

use super::{users::duplicate_username, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{member::Member, user::UserForm},
};

const MEMBER_SELECT: &str = r#"
    SELECT m.id, m.user_id, m.outstanding_debt,
           u.username, u.first_name, u.last_name, u.email
    FROM members m
    JOIN users u ON u.id = m.user_id
"#;

impl Repository {
    /// List members by username
    pub async fn members_list(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, Member>(&format!("{} ORDER BY u.username", MEMBER_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get member by ID
    pub async fn members_get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(&format!("{} WHERE m.id = $1", MEMBER_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    /// Update a member and its user. The password is kept when
    /// `password_hash` is `None`.
    pub async fn members_update(
        &self,
        id: i32,
        user: &UserForm,
        password_hash: Option<String>,
        outstanding_debt: Decimal,
    ) -> AppResult<Member> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i32>(
            "UPDATE members SET outstanding_debt = $2 WHERE id = $1 RETURNING user_id",
        )
        .bind(id)
        .bind(outstanding_debt)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4, email = $5,
                password = COALESCE($6, password), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_deref().unwrap_or_default())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::unique(e, duplicate_username()))?;

        tx.commit().await?;

        self.members_get_by_id(id).await
    }

    /// Delete a member together with its user
    pub async fn members_delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i32>("SELECT user_id FROM members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        // members.user_id cascades
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
