//! Member model: the borrowing side of a user account

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{
    book_instance::max_amount,
    user::{UserForm, UserShort},
};

/// Member row joined with its user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Member {
    pub id: i32,
    pub user_id: i32,
    pub outstanding_debt: Decimal,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Member {
    /// Whether the member's debt is within `threshold`
    pub fn can_borrow(&self, threshold: Decimal) -> bool {
        self.outstanding_debt <= threshold
    }
}

/// Member as returned by the API, with the eligibility flag resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberDetails {
    pub id: i32,
    pub user: UserShort,
    pub outstanding_debt: Decimal,
    pub can_borrow: bool,
}

impl MemberDetails {
    pub fn new(member: Member, threshold: Decimal) -> Self {
        let can_borrow = member.can_borrow(threshold);
        Self {
            id: member.id,
            user: UserShort {
                id: member.user_id,
                username: member.username,
                first_name: member.first_name,
                last_name: member.last_name,
                email: member.email,
            },
            outstanding_debt: member.outstanding_debt,
            can_borrow,
        }
    }
}

/// Debt sub-form
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct MemberForm {
    #[validate(custom(function = "validate_debt"))]
    #[serde(default)]
    pub outstanding_debt: Decimal,
}

fn validate_debt(debt: &Decimal) -> Result<(), ValidationError> {
    if debt.is_sign_negative() || *debt > max_amount() || debt.scale() > 2 {
        return Err(crate::error::field_error(
            "outstanding_debt",
            "Debt must be between 0 and 999999.99 with at most 2 decimal places",
        ));
    }
    Ok(())
}

/// Create or update member request: a user sub-form paired with a debt sub-form
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberRequest {
    pub user: UserForm,
    #[serde(default)]
    pub member: MemberForm,
}
