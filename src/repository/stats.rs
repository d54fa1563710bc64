//! Summary counts on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::{book_instance::LoanStatus, stats::CatalogSummary},
};

impl Repository {
    /// Counts shown on the index page
    pub async fn stats_summary(&self) -> AppResult<CatalogSummary> {
        let (num_books, num_instances, num_instances_available, num_authors): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM books),
                    (SELECT COUNT(*) FROM book_instances),
                    (SELECT COUNT(*) FROM book_instances WHERE status = $1),
                    (SELECT COUNT(*) FROM authors)
                "#,
            )
            .bind(LoanStatus::Available)
            .fetch_one(&self.pool)
            .await?;

        Ok(CatalogSummary {
            num_books,
            num_instances,
            num_instances_available,
            num_authors,
        })
    }
}
