//! User access administration

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::user::{UpdateAccess, User},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// Replace a user's groups, permissions and superuser flag
#[utoipa::path(
    put,
    path = "/users/{id}/access",
    tag = "users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateAccess,
    responses(
        (status = 200, description = "Access updated", body = User),
        (status = 403, description = "Caller is not a superuser", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_access(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<UpdateAccess>,
) -> AppResult<Json<User>> {
    session.authorize(Operation::ManageAccess).await?;
    let Json(access) = body?;
    let user = state.services.users.update_access(id, &access).await?;
    Ok(Json(user))
}
