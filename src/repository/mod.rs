//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod instances;
pub mod loans;
pub mod members;
pub mod stats;
pub mod taxonomy;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};

/// Main repository struct holding the database connection pool.
///
/// Each domain adds its methods in its own module (`books_*`, `loans_*`, ...).
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

/// Maps a foreign key violation raised by an insert or update to a form error:
/// the request referenced a row that does not exist.
pub(crate) fn invalid_reference(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::field(
            crate::error::FORM_FIELD,
            "invalid_reference",
            "Select a valid choice. That choice is not one of the available choices.",
        ),
        _ => AppError::Database(err),
    }
}
