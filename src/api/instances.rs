//! Book instance (copy) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{BookInstance, BookInstanceShort, CreateBookInstance, UpdateBookInstance},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// List copies by due date
#[utoipa::path(
    get,
    path = "/instances",
    tag = "instances",
    responses(
        (status = 200, description = "Book instances", body = Vec<BookInstanceShort>)
    )
)]
pub async fn list_instances(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<BookInstanceShort>>> {
    session.authorize(Operation::ViewCatalog).await?;
    let instances = state.services.catalog.list_instances().await?;
    Ok(Json(instances))
}

/// Get copy
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 200, description = "Book instance", body = BookInstance),
        (status = 404, description = "Book instance not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_instance(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    session.authorize(Operation::ViewCatalog).await?;
    let instance = state.services.catalog.get_instance(id).await?;
    Ok(Json(instance))
}

/// Create copy
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Book instance created", body = BookInstance),
        (status = 403, description = "Caller is not a librarian", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_instance(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    session.authorize(Operation::CreateInstance).await?;
    let Json(data) = body?;
    let instance = state.services.catalog.create_instance(&data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Update imprint, due date, status and borrower of a copy
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Book instance updated", body = BookInstance)
    )
)]
pub async fn update_instance(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    body: JsonBody<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    session.authorize(Operation::UpdateInstance).await?;
    let Json(data) = body?;
    let instance = state.services.catalog.update_instance(id, &data).await?;
    Ok(Json(instance))
}

/// Delete copy
#[utoipa::path(
    delete,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Book instance ID")),
    responses(
        (status = 204, description = "Book instance deleted")
    )
)]
pub async fn delete_instance(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::DeleteInstance).await?;
    state.services.catalog.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
