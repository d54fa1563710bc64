//! Book instance (copy) domain methods on Repository

use uuid::Uuid;

use super::{invalid_reference, Repository};
use crate::{
    error::{AppError, AppResult},
    models::book_instance::{
        BookInstance, BookInstanceShort, CreateBookInstance, LoanStatus, UpdateBookInstance,
    },
};

pub(crate) const INSTANCE_COLUMNS: &str = "id, book_id, imprint, borrower_id, due_back, status, rent_fee";

pub(crate) const INSTANCE_SHORT_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
           bi.borrower_id, u.username AS borrower_username,
           bi.due_back, bi.status, bi.rent_fee
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

impl Repository {
    /// List all copies by due date
    pub async fn instances_list(&self) -> AppResult<Vec<BookInstanceShort>> {
        let rows = sqlx::query_as::<_, BookInstanceShort>(&format!(
            "{} ORDER BY bi.due_back, bi.id",
            INSTANCE_SHORT_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Copies currently in `status`, by due date
    pub async fn instances_by_status(&self, status: LoanStatus) -> AppResult<Vec<BookInstanceShort>> {
        let rows = sqlx::query_as::<_, BookInstanceShort>(&format!(
            "{} WHERE bi.status = $1 ORDER BY bi.due_back, bi.id",
            INSTANCE_SHORT_SELECT
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Copies of a book
    pub async fn instances_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE book_id = $1 ORDER BY due_back, id",
            INSTANCE_COLUMNS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get copy by ID
    pub async fn instances_get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Create copy with a fresh random id
    pub async fn instances_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status.unwrap_or_default())
        .bind(data.borrower_id)
        .fetch_one(&self.pool)
        .await
        .map_err(invalid_reference)?;
        Ok(row)
    }

    /// Update the editable fields of a copy
    pub async fn instances_update(&self, id: Uuid, data: &UpdateBookInstance) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET imprint = $2, due_back = $3, status = $4, borrower_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .bind(&data.imprint)
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(invalid_reference)?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Delete copy
    pub async fn instances_delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
