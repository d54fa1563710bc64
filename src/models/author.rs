//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Author with the books attributed to them
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorDetails {
    #[serde(flatten)]
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create or update author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_lifespan", skip_on_field_errors = false))]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

fn validate_lifespan(form: &AuthorForm) -> Result<(), ValidationError> {
    match (form.date_of_birth, form.date_of_death) {
        (Some(born), Some(died)) if died < born => {
            Err(crate::error::field_error("lifespan", "Date of death precedes date of birth"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(born: Option<NaiveDate>, died: Option<NaiveDate>) -> AuthorForm {
        AuthorForm {
            first_name: "John".into(),
            last_name: "Doe".into(),
            date_of_birth: born,
            date_of_death: died,
        }
    }

    #[test]
    fn test_display_name() {
        let author = Author {
            id: 1,
            first_name: "John".into(),
            last_name: "Doe".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        assert_eq!(author.display_name(), "Doe, John");
    }

    #[test]
    fn test_lifespan_validation() {
        let born = NaiveDate::from_ymd_opt(1900, 1, 1);
        let died = NaiveDate::from_ymd_opt(1980, 6, 1);
        assert!(form(born, died).validate().is_ok());
        assert!(form(None, died).validate().is_ok());
        assert!(form(died, born).validate().is_err());
    }
}
