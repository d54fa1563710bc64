//! Book instance (physical copy) model and the loan state machine

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Largest amount the NUMERIC(8, 2) money columns hold
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999, 2)
}

/// Loan status of a copy. Stored as a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status: {}", other)),
        }
    }
}

// SQLx conversion for LoanStatus (CHAR(1) column)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

/// Overdue fee for a copy returned on `return_date`.
///
/// Whole days past the due date times the daily fee; zero when the copy has
/// no due date or comes back on time.
pub fn rent_fee(due_back: Option<NaiveDate>, return_date: NaiveDate, daily_fee: Decimal) -> Decimal {
    match due_back {
        Some(due) if return_date > due => {
            let days = (return_date - due).num_days();
            Decimal::from(days) * daily_fee
        }
        _ => Decimal::ZERO,
    }
}

/// Book instance from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub borrower_id: Option<i32>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Fee computed at the last return
    pub rent_fee: Decimal,
}

/// Fee owed by a borrower after a return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub borrower_id: Option<i32>,
    pub fee: Decimal,
}

impl Settlement {
    /// Fails when the fee does not fit the money columns, which happens for
    /// a due date edited decades into the past
    pub fn check_storable(&self) -> AppResult<()> {
        if self.fee > max_amount() {
            return Err(AppError::Conflict(format!(
                "Rent fee {} exceeds the largest storable amount {}; correct the due date first",
                self.fee,
                max_amount()
            )));
        }
        Ok(())
    }
}

impl BookInstance {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| today > due).unwrap_or(false)
    }

    /// Lend the copy to `borrower_id` for `loan_period_days`
    pub fn issue(&mut self, borrower_id: i32, today: NaiveDate, loan_period_days: i64) {
        self.borrower_id = Some(borrower_id);
        self.due_back = Some(today + Duration::days(loan_period_days));
        self.status = LoanStatus::OnLoan;
    }

    /// Take the copy back. The fee is computed from the current due date
    /// before it is cleared and replaces any fee recorded earlier.
    pub fn settle_return(&mut self, return_date: NaiveDate, daily_fee: Decimal) -> Settlement {
        self.rent_fee = rent_fee(self.due_back, return_date, daily_fee);
        let settlement = Settlement {
            borrower_id: self.borrower_id,
            fee: self.rent_fee,
        };

        self.borrower_id = None;
        self.due_back = None;
        self.status = LoanStatus::Available;

        settlement
    }
}

/// Copy with its book title and borrower, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceShort {
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub book_title: Option<String>,
    pub imprint: String,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub rent_fee: Decimal,
    #[sqlx(skip)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl BookInstanceShort {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.due_back.map(|due| today > due).unwrap_or(false);
        self
    }
}

/// Create book instance request
#[derive(Debug, Deserialize, ToSchema, validator::Validate)]
pub struct CreateBookInstance {
    pub book_id: i32,
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<i32>,
}

/// Update book instance request. Only these fields may change after creation.
#[derive(Debug, Deserialize, ToSchema, validator::Validate)]
pub struct UpdateBookInstance {
    #[validate(length(min = 1, max = 200, message = "Imprint must be 1 to 200 characters"))]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn instance(status: LoanStatus) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Sample Imprint".to_string(),
            borrower_id: None,
            due_back: None,
            status,
            rent_fee: Decimal::ZERO,
        }
    }

    #[test]
    fn test_rent_fee_late_return() {
        let due = date(2024, 3, 1);
        for days in [1i64, 5, 30, 365] {
            let returned = due + Duration::days(days);
            assert_eq!(
                rent_fee(Some(due), returned, Decimal::from(50)),
                Decimal::from(days * 50)
            );
        }
    }

    #[test]
    fn test_rent_fee_on_time_or_early() {
        let due = date(2024, 3, 1);
        assert_eq!(rent_fee(Some(due), due, Decimal::from(50)), Decimal::ZERO);
        assert_eq!(
            rent_fee(Some(due), due - Duration::days(3), Decimal::from(50)),
            Decimal::ZERO
        );
        assert_eq!(rent_fee(None, due, Decimal::from(50)), Decimal::ZERO);
    }

    #[test]
    fn test_unstorable_fee_is_a_conflict() {
        let today = date(2024, 3, 10);
        let mut copy = instance(LoanStatus::OnLoan);
        copy.borrower_id = Some(7);
        copy.due_back = Some(today - Duration::days(20_000));
        let settlement = copy.settle_return(today, Decimal::from(50));
        assert_eq!(settlement.fee, Decimal::from(1_000_000));
        assert!(matches!(settlement.check_storable(), Err(AppError::Conflict(_))));

        let mut copy = instance(LoanStatus::OnLoan);
        copy.due_back = Some(today - Duration::days(5));
        assert!(copy.settle_return(today, Decimal::from(50)).check_storable().is_ok());
    }

    #[test]
    fn test_is_overdue() {
        let today = date(2024, 3, 10);
        let mut copy = instance(LoanStatus::OnLoan);
        assert!(!copy.is_overdue(today));

        copy.due_back = Some(today);
        assert!(!copy.is_overdue(today));

        copy.due_back = Some(today - Duration::days(1));
        assert!(copy.is_overdue(today));
    }

    #[test]
    fn test_issue_sets_borrower_and_due_date() {
        let today = date(2024, 3, 10);
        let mut copy = instance(LoanStatus::Available);
        copy.issue(7, today, 21);

        assert_eq!(copy.status, LoanStatus::OnLoan);
        assert_eq!(copy.borrower_id, Some(7));
        assert_eq!(copy.due_back, Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_return_five_days_late() {
        let today = date(2024, 3, 10);
        let mut copy = instance(LoanStatus::OnLoan);
        copy.borrower_id = Some(7);
        copy.due_back = Some(today - Duration::days(5));

        let settlement = copy.settle_return(today, Decimal::from(50));

        assert_eq!(settlement, Settlement { borrower_id: Some(7), fee: Decimal::from(250) });
        assert_eq!(copy.rent_fee, Decimal::from(250));
        assert_eq!(copy.status, LoanStatus::Available);
        assert_eq!(copy.borrower_id, None);
        assert_eq!(copy.due_back, None);
    }

    #[test]
    fn test_return_replaces_previous_fee() {
        let today = date(2024, 3, 10);
        let mut copy = instance(LoanStatus::OnLoan);
        copy.rent_fee = Decimal::from(400);
        copy.borrower_id = Some(2);
        copy.due_back = Some(today + Duration::days(2));

        let settlement = copy.settle_return(today, Decimal::from(50));

        assert_eq!(settlement.fee, Decimal::ZERO);
        assert_eq!(copy.rent_fee, Decimal::ZERO);
    }

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            LoanStatus::Maintenance,
            LoanStatus::OnLoan,
            LoanStatus::Available,
            LoanStatus::Reserved,
        ] {
            assert_eq!(status.code().parse::<LoanStatus>(), Ok(status));
        }
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
    }
}
