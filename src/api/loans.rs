//! Circulation endpoints: loan lists, issue, return and renewal

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{BookInstance, BookInstanceShort},
        loan::{
            IssueChoices, IssueRequest, LoanView, RenewRequest, RenewalProposal, ReturnReceipt,
            ReturnRequest,
        },
    },
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// Copies on loan to the caller, by due date
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Caller's loans", body = Vec<BookInstanceShort>),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_my_loans(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<BookInstanceShort>>> {
    let claims = session.user(Operation::ViewOwnLoans).await?;
    let loans = state.services.loans.loans_for_user(claims.user_id).await?;
    Ok(Json(loans))
}

/// Every copy on loan with its borrower's debt
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "All loans", body = Vec<LoanView>)
    )
)]
pub async fn list_all_loans(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<LoanView>>> {
    session.authorize(Operation::ViewAllLoans).await?;
    let loans = state.services.loans.all_loans().await?;
    Ok(Json(loans))
}

/// Users and available copies to pick from
#[utoipa::path(
    get,
    path = "/loans/issue",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Issue choices", body = IssueChoices)
    )
)]
pub async fn issue_choices(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<IssueChoices>> {
    session.authorize(Operation::IssueBook).await?;
    let choices = state.services.loans.issue_choices().await?;
    Ok(Json(choices))
}

/// Lend an available copy to a user
#[utoipa::path(
    post,
    path = "/loans/issue",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = IssueRequest,
    responses(
        (status = 200, description = "Copy issued", body = BookInstance),
        (status = 409, description = "Copy is not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn issue_book(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<IssueRequest>,
) -> AppResult<Json<BookInstance>> {
    session.authorize(Operation::IssueBook).await?;
    let Json(request) = body?;
    let instance = state.services.loans.issue(&request).await?;
    Ok(Json(instance))
}

/// Copies currently on loan
#[utoipa::path(
    get,
    path = "/loans/return",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Return candidates", body = Vec<BookInstanceShort>)
    )
)]
pub async fn return_candidates(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<BookInstanceShort>>> {
    session.authorize(Operation::ReturnBook).await?;
    let instances = state.services.loans.return_candidates().await?;
    Ok(Json(instances))
}

/// Take a copy back, charging any overdue fee
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Copy returned", body = ReturnReceipt),
        (status = 409, description = "Copy is not on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<ReturnRequest>,
) -> AppResult<Json<ReturnReceipt>> {
    session.authorize(Operation::ReturnBook).await?;
    let Json(request) = body?;
    let receipt = state.services.loans.return_book(request.instance_id).await?;
    Ok(Json(receipt))
}

/// Proposed renewal date for a copy
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Renewal proposal", body = RenewalProposal)
    )
)]
pub async fn renewal_proposal(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalProposal>> {
    session.authorize(Operation::RenewBook).await?;
    let proposal = state.services.loans.renewal_proposal(id).await?;
    Ok(Json(proposal))
}

/// Set a new due date within the renewal window
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Copy renewed", body = BookInstance),
        (status = 422, description = "Date outside the renewal window", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew_instance(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    body: JsonBody<RenewRequest>,
) -> AppResult<Json<BookInstance>> {
    session.authorize(Operation::RenewBook).await?;
    let Json(request) = body?;
    let instance = state.services.loans.renew(id, &request).await?;
    Ok(Json(instance))
}
