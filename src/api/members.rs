//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::member::{MemberDetails, MemberRequest},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// List members
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Members", body = Vec<MemberDetails>)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<MemberDetails>>> {
    session.authorize(Operation::ManageMembers).await?;
    let members = state.services.users.list_members().await?;
    Ok(Json(members))
}

/// Get member
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member", body = MemberDetails),
        (status = 404, description = "Member not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Json<MemberDetails>> {
    session.authorize(Operation::ManageMembers).await?;
    let member = state.services.users.get_member(id).await?;
    Ok(Json(member))
}

/// Register a user and its member
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = MemberRequest,
    responses(
        (status = 201, description = "Member created", body = MemberDetails),
        (status = 422, description = "Invalid form or duplicate username", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<MemberRequest>,
) -> AppResult<(StatusCode, Json<MemberDetails>)> {
    session.authorize(Operation::ManageMembers).await?;
    let Json(request) = body?;
    let member = state.services.users.create_member(&request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Update a member and its user
#[utoipa::path(
    put,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberDetails),
        (status = 422, description = "Invalid form or duplicate username", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<MemberRequest>,
) -> AppResult<Json<MemberDetails>> {
    session.authorize(Operation::ManageMembers).await?;
    let Json(request) = body?;
    let member = state.services.users.update_member(id, &request).await?;
    Ok(Json(member))
}

/// Delete a member and its user
#[utoipa::path(
    delete,
    path = "/members/{id}",
    tag = "members",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member deleted")
    )
)]
pub async fn delete_member(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::ManageMembers).await?;
    state.services.users.delete_member(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
