//! Index summary endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::stats::CatalogSummary, policy::Operation, AppState};

use super::Session;

/// Number of books, copies, available copies and authors
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Catalog summary", body = CatalogSummary)
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Json<CatalogSummary>> {
    session.authorize(Operation::ViewSummary).await?;
    let summary = state.services.catalog.summary().await?;
    Ok(Json(summary))
}
