//! Genre and language models (case-insensitively unique names)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book genre (e.g. Science Fiction, French Poetry)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

/// Natural language of a book (e.g. English, French, Japanese)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

/// Create or rename a genre or a language
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NameForm {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
}

impl NameForm {
    /// Name with surrounding whitespace removed
    pub fn normalized(&self) -> &str {
        self.name.trim()
    }
}
