//! Circulation domain methods on Repository: issue, return, renew and loan lists

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    instances::{INSTANCE_COLUMNS, INSTANCE_SHORT_SELECT},
    Repository,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, BookInstanceShort, LoanStatus},
        loan::{LoanView, ReturnReceipt},
    },
};

impl Repository {
    /// Store an issued copy. Applies only while the stored copy is still
    /// available; returns `None` when another request got there first.
    pub async fn loans_issue(&self, issued: &BookInstance) -> AppResult<Option<BookInstance>> {
        let row = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET borrower_id = $2, due_back = $3, status = $4
            WHERE id = $1 AND status = $5
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(issued.id)
        .bind(issued.borrower_id)
        .bind(issued.due_back)
        .bind(issued.status)
        .bind(LoanStatus::Available)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Take a copy back on `return_date`.
    ///
    /// The copy is locked for the duration of the transaction; the fee is
    /// computed from its current due date, stored on the copy and added to
    /// the borrower's debt.
    pub async fn loans_return(
        &self,
        instance_id: Uuid,
        return_date: NaiveDate,
        daily_fee: Decimal,
    ) -> AppResult<ReturnReceipt> {
        let mut tx = self.pool.begin().await?;

        let mut instance = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1 FOR UPDATE",
            INSTANCE_COLUMNS
        ))
        .bind(instance_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", instance_id)))?;

        if instance.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Book instance {} is not on loan ({})",
                instance_id, instance.status
            )));
        }

        let settlement = instance.settle_return(return_date, daily_fee);
        settlement.check_storable()?;

        let instance = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET borrower_id = $2, due_back = $3, status = $4, rent_fee = $5
            WHERE id = $1
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(instance.id)
        .bind(instance.borrower_id)
        .bind(instance.due_back)
        .bind(instance.status)
        .bind(instance.rent_fee)
        .fetch_one(&mut *tx)
        .await?;

        let outstanding_debt = match settlement.borrower_id {
            Some(borrower_id) => {
                sqlx::query_scalar::<_, Decimal>(
                    r#"
                    UPDATE members SET outstanding_debt = outstanding_debt + $2
                    WHERE user_id = $1
                    RETURNING outstanding_debt
                    "#,
                )
                .bind(borrower_id)
                .bind(settlement.fee)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::out_of_range(
                        e,
                        format!(
                            "Debt of user {} would exceed the largest storable amount",
                            borrower_id
                        ),
                    )
                })?
            }
            None => None,
        };

        tx.commit().await?;

        Ok(ReturnReceipt {
            instance,
            fee: settlement.fee,
            outstanding_debt,
        })
    }

    /// Overwrite a copy's due date
    pub async fn loans_renew(&self, instance_id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "UPDATE book_instances SET due_back = $2 WHERE id = $1 RETURNING {}",
            INSTANCE_COLUMNS
        ))
        .bind(instance_id)
        .bind(due_back)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", instance_id)))
    }

    /// Copies on loan to a user, by due date
    pub async fn loans_for_borrower(&self, user_id: i32) -> AppResult<Vec<BookInstanceShort>> {
        let rows = sqlx::query_as::<_, BookInstanceShort>(&format!(
            "{} WHERE bi.borrower_id = $1 AND bi.status = $2 ORDER BY bi.due_back, bi.id",
            INSTANCE_SHORT_SELECT
        ))
        .bind(user_id)
        .bind(LoanStatus::OnLoan)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every copy on loan with its borrower's debt, by due date
    pub async fn loans_list_all(&self) -> AppResult<Vec<LoanView>> {
        let rows = sqlx::query_as::<_, LoanView>(
            r#"
            SELECT bi.id AS instance_id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.status, bi.due_back, bi.rent_fee,
                   bi.borrower_id, u.username AS borrower_username,
                   m.outstanding_debt
            FROM book_instances bi
            LEFT JOIN books b ON b.id = bi.book_id
            LEFT JOIN users u ON u.id = bi.borrower_id
            LEFT JOIN members m ON m.user_id = bi.borrower_id
            WHERE bi.status = $1
            ORDER BY bi.due_back, bi.id
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
