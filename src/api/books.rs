//! Book and search endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, BookForm, BookSearch, BookShort},
    policy::Operation,
    AppState,
};

use super::{JsonBody, Session};

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "Books by title", body = Vec<BookShort>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<Vec<BookShort>>> {
    session.authorize(Operation::ViewCatalog).await?;
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Search books by title or author name
#[utoipa::path(
    get,
    path = "/search",
    tag = "books",
    params(BookSearch),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookShort>)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    session: Session,
    Query(search): Query<BookSearch>,
) -> AppResult<Json<Vec<BookShort>>> {
    session.authorize(Operation::SearchBooks).await?;
    let books = state.services.catalog.search_books(&search).await?;
    Ok(Json(books))
}

/// Get book with author, language, genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    session.authorize(Operation::ViewCatalog).await?;
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
    session.authorize(Operation::CreateBook).await?;
    let Json(form) = body?;
    let book = state.services.catalog.create_book(&form).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 422, description = "Invalid form", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    body: JsonBody<BookForm>,
) -> AppResult<Json<Book>> {
    session.authorize(Operation::UpdateBook).await?;
    let Json(form) = body?;
    let book = state.services.catalog.update_book(id, &form).await?;
    Ok(Json(book))
}

/// Delete book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 409, description = "Book still has copies", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    session.authorize(Operation::DeleteBook).await?;
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
