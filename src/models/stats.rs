//! Index summary counts

use serde::Serialize;
use utoipa::ToSchema;

/// Library-wide counts shown on the home page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
}
