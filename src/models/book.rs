//! Book model, search filter and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{author::Author, book_instance::BookInstance, genre::{Genre, Language}};

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub author_id: Option<i32>,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
}

/// Book with its author, language, genres and copies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    /// First three genre names, comma separated
    pub display_genre: String,
    pub instances: Vec<BookInstance>,
}

/// First three genre names, comma separated
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(3)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Create or update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    /// 13 character ISBN
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let valid_chars = isbn
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || (c == 'X' && i == isbn.len() - 1));
    if isbn.is_empty() || isbn.len() > 13 || !valid_chars {
        return Err(crate::error::field_error(
            "isbn",
            "ISBN must be at most 13 digits (an ISBN-10 may end with X)",
        ));
    }
    Ok(())
}

/// Search filters. Books matching either filter are returned.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookSearch {
    /// Case-insensitive substring of the title
    pub book_name: Option<String>,
    /// Case-insensitive substring of the author's first or last name
    pub author_name: Option<String>,
}

impl BookSearch {
    fn term(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|s| !s.is_empty())
    }

    /// SQL condition over `books b LEFT JOIN authors a` with its bound
    /// ILIKE patterns, or `None` when no filter is set.
    pub fn where_clause(&self) -> Option<(String, Vec<String>)> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(title) = Self::term(&self.book_name) {
            params.push(like_pattern(title));
            conditions.push(format!("b.title ILIKE ${} ESCAPE '\\'", params.len()));
        }

        if let Some(name) = Self::term(&self.author_name) {
            params.push(like_pattern(name));
            conditions.push(format!(
                "(a.first_name ILIKE ${p} ESCAPE '\\' OR a.last_name ILIKE ${p} ESCAPE '\\')",
                p = params.len()
            ));
        }

        if conditions.is_empty() {
            None
        } else {
            Some((conditions.join(" OR "), params))
        }
    }
}

/// `%term%` with LIKE wildcards in `term` escaped
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
