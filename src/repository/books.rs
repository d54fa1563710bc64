//! Book domain methods on Repository

use sqlx::{Postgres, Transaction};

use super::{invalid_reference, Repository};
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookForm, BookSearch, BookShort},
};

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.author_id,
           a.first_name AS author_first_name, a.last_name AS author_last_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

fn duplicate_isbn() -> AppError {
    AppError::field("isbn", "duplicate", "Book with this ISBN already exists.")
}

fn write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_isbn(),
        _ => invalid_reference(err),
    }
}

impl Repository {
    /// List all books by title
    pub async fn books_list(&self) -> AppResult<Vec<BookShort>> {
        let rows = sqlx::query_as::<_, BookShort>(&format!("{} ORDER BY b.title, b.id", BOOK_SHORT_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books matching the title filter or the author filter
    pub async fn books_search(&self, search: &BookSearch) -> AppResult<Vec<BookShort>> {
        let Some((condition, params)) = search.where_clause() else {
            return self.books_list().await;
        };

        let query = format!("{} WHERE {} ORDER BY b.title, b.id", BOOK_SHORT_SELECT, condition);
        let mut builder = sqlx::query_as::<_, BookShort>(&query);
        for param in &params {
            builder = builder.bind(param);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Books attributed to an author
    pub async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let rows = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author_id, summary, isbn, language_id FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    /// Create book with its genres
    pub async fn books_create(&self, data: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author_id, summary, isbn, language_id
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.language_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error)?;

        set_book_genres(&mut tx, book.id, &data.genre_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Update book and replace its genre set
    pub async fn books_update(&self, id: i32, data: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, summary = $4, isbn = $5, language_id = $6
            WHERE id = $1
            RETURNING id, title, author_id, summary, isbn, language_id
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(data.language_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error)?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        set_book_genres(&mut tx, book.id, &data.genre_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Delete book. Rejected while any copy of it exists.
    pub async fn books_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::restrict(
                    e,
                    format!("Book {} has copies and cannot be deleted; delete its copies first", id),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }
}

async fn set_book_genres(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i32,
    genre_ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    if genre_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO book_genres (book_id, genre_id)
        SELECT $1, genre_id FROM UNNEST($2::int[]) AS genre_id
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(genre_ids)
    .execute(&mut **tx)
    .await
    .map_err(invalid_reference)?;

    Ok(())
}
