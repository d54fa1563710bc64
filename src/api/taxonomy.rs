//! Genre and language endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::genre::{Genre, Language, NameForm},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// List genres
#[utoipa::path(
    get,
    path = "/genres",
    tag = "taxonomy",
    responses(
        (status = 200, description = "Genres by name", body = Vec<Genre>)
    )
)]
pub async fn list_genres(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Genre>>> {
    session.authorize(Operation::ViewCatalog).await?;
    Ok(Json(state.services.catalog.list_genres().await?))
}

/// Get genre
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "taxonomy",
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_genre(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    session.authorize(Operation::ViewCatalog).await?;
    Ok(Json(state.services.catalog.get_genre(id).await?))
}

/// Create genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = NameForm,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 422, description = "Duplicate or invalid name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_genre(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<NameForm>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    session.authorize(Operation::ManageTaxonomy).await?;
    let Json(form) = body?;
    let genre = state.services.catalog.create_genre(&form).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// Rename genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    request_body = NameForm,
    responses(
        (status = 200, description = "Genre updated", body = Genre)
    )
)]
pub async fn update_genre(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<NameForm>,
) -> AppResult<Json<Genre>> {
    session.authorize(Operation::ManageTaxonomy).await?;
    let Json(form) = body?;
    Ok(Json(state.services.catalog.update_genre(id, &form).await?))
}

/// Delete genre
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Genre ID")),
    responses(
        (status = 204, description = "Genre deleted")
    )
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::ManageTaxonomy).await?;
    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List languages
#[utoipa::path(
    get,
    path = "/languages",
    tag = "taxonomy",
    responses(
        (status = 200, description = "Languages by name", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<Language>>> {
    session.authorize(Operation::ViewCatalog).await?;
    Ok(Json(state.services.catalog.list_languages().await?))
}

/// Get language
#[utoipa::path(
    get,
    path = "/languages/{id}",
    tag = "taxonomy",
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 200, description = "Language", body = Language),
        (status = 404, description = "Language not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_language(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Json<Language>> {
    session.authorize(Operation::ViewCatalog).await?;
    Ok(Json(state.services.catalog.get_language(id).await?))
}

/// Create language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = NameForm,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 422, description = "Duplicate or invalid name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_language(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<NameForm>,
) -> AppResult<(StatusCode, Json<Language>)> {
    session.authorize(Operation::ManageTaxonomy).await?;
    let Json(form) = body?;
    let language = state.services.catalog.create_language(&form).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// Rename language
#[utoipa::path(
    put,
    path = "/languages/{id}",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    request_body = NameForm,
    responses(
        (status = 200, description = "Language updated", body = Language)
    )
)]
pub async fn update_language(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<NameForm>,
) -> AppResult<Json<Language>> {
    session.authorize(Operation::ManageTaxonomy).await?;
    let Json(form) = body?;
    Ok(Json(state.services.catalog.update_language(id, &form).await?))
}

/// Delete language
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    tag = "taxonomy",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted")
    )
)]
pub async fn delete_language(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::ManageTaxonomy).await?;
    state.services.catalog.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
