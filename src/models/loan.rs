//! Loan (issue/return/renew) request and view types

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use super::{
    book_instance::{BookInstance, BookInstanceShort, LoanStatus},
    user::UserShort,
};
use crate::error::field_error;

/// Issue a copy to a user
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueRequest {
    pub user_id: i32,
    pub instance_id: Uuid,
}

/// Return a copy
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub instance_id: Uuid,
}

/// Renew a copy until `renewal_date`
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenewRequest {
    pub renewal_date: NaiveDate,
}

impl RenewRequest {
    /// Accepts any date from today to `window_days` ahead, inclusive
    pub fn validate_window(&self, today: NaiveDate, window_days: i64) -> Result<(), ValidationErrors> {
        let error = check_renewal_date(self.renewal_date, today, window_days);
        match error {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut errors = ValidationErrors::new();
                errors.add("renewal_date", e);
                Err(errors)
            }
        }
    }
}

fn check_renewal_date(date: NaiveDate, today: NaiveDate, window_days: i64) -> Result<(), ValidationError> {
    if date < today {
        return Err(field_error("renewal_in_past", "Invalid date - renewal in past"));
    }
    if date > today + Duration::days(window_days) {
        return Err(field_error(
            "renewal_too_far",
            format!("Invalid date - renewal more than {} ahead", window_label(window_days)),
        ));
    }
    Ok(())
}

/// "4 weeks" for whole weeks, "10 days" otherwise
fn window_label(days: i64) -> String {
    match (days % 7, days / 7) {
        (0, 1) => "1 week".to_string(),
        (0, weeks) if weeks > 0 => format!("{} weeks", weeks),
        (_, _) if days == 1 => "1 day".to_string(),
        _ => format!("{} days", days),
    }
}

/// Renewal form contents: the copy and the proposed date
#[derive(Debug, Serialize, ToSchema)]
pub struct RenewalProposal {
    pub instance: BookInstance,
    pub proposed_renewal_date: NaiveDate,
    pub latest_renewal_date: NaiveDate,
}

/// Choices offered by the issue form
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueChoices {
    pub users: Vec<UserShort>,
    pub instances: Vec<BookInstanceShort>,
}

/// On-loan copy with its borrower's debt, for the librarian loan list
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanView {
    pub instance_id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub status: LoanStatus,
    pub due_back: Option<NaiveDate>,
    pub rent_fee: Decimal,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub outstanding_debt: Option<Decimal>,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl LoanView {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.due_back.map(|due| today > due).unwrap_or(false);
        self
    }
}

/// Result of a return
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnReceipt {
    pub instance: BookInstance,
    /// Fee charged for this return
    pub fee: Decimal,
    /// Borrower's debt after the fee was added
    pub outstanding_debt: Option<Decimal>,
}
