//! Author endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorDetails, AuthorForm},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "Authors by last name, first name", body = Vec<Author>)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Author>>> {
    session.authorize(Operation::ViewCatalog).await?;
    let authors = state.services.catalog.list_authors().await?;
    Ok(Json(authors))
}

/// Get author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetails),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetails>> {
    session.authorize(Operation::ViewCatalog).await?;
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<AuthorForm>,
) -> AppResult<(StatusCode, Json<Author>)> {
    session.authorize(Operation::CreateAuthor).await?;
    let Json(form) = body?;
    let author = state.services.catalog.create_author(&form).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author)
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<AuthorForm>,
) -> AppResult<Json<Author>> {
    session.authorize(Operation::UpdateAuthor).await?;
    let Json(form) = body?;
    let author = state.services.catalog.update_author(id, &form).await?;
    Ok(Json(author))
}

/// Delete author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 409, description = "Author still has books", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::DeleteAuthor).await?;
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
