//! Session endpoints: login, logout and current user

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, User},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// Log in with username and password.
///
/// The token is returned in the body and set as an HttpOnly session cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: JsonBody<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let Json(request) = body?;
    let users = &state.services.users;
    let (token, user) = users.authenticate(&request.username, &request.password).await?;

    let cookie = Cookie::build((state.config.auth.cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.cookie_secure);

    let response = LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: users.token_lifetime(),
        user,
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((state.config.auth.cookie_name.clone(), "")).path("/"))
}

/// Current user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not logged in", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(State(state): State<AppState>, session: Session) -> AppResult<Json<User>> {
    let claims = session.user(Operation::ViewSession).await?;
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}
