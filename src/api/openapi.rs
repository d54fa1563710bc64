//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, instances, loans, members, stats, taxonomy, users};

/// Registers the bearer token and session cookie schemes referenced by the paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("catalog_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.3.0",
        description = "Local library catalog and circulation REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Stats
        stats::get_summary,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres and languages
        taxonomy::list_genres,
        taxonomy::get_genre,
        taxonomy::create_genre,
        taxonomy::update_genre,
        taxonomy::delete_genre,
        taxonomy::list_languages,
        taxonomy::get_language,
        taxonomy::create_language,
        taxonomy::update_language,
        taxonomy::delete_language,
        // Instances
        instances::list_instances,
        instances::get_instance,
        instances::create_instance,
        instances::update_instance,
        instances::delete_instance,
        // Loans
        loans::list_my_loans,
        loans::list_all_loans,
        loans::issue_choices,
        loans::issue_book,
        loans::return_candidates,
        loans::return_book,
        loans::renewal_proposal,
        loans::renew_instance,
        // Members
        members::list_members,
        members::get_member,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Users
        users::update_access,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserForm,
            crate::models::user::UpdateAccess,
            crate::models::user::Permission,
            crate::models::user::Group,
            // Catalog
            crate::models::genre::Genre,
            crate::models::genre::Language,
            crate::models::genre::NameForm,
            crate::models::author::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorForm,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookForm,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceShort,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::UpdateBookInstance,
            crate::models::book_instance::LoanStatus,
            crate::models::stats::CatalogSummary,
            // Loans
            crate::models::loan::IssueRequest,
            crate::models::loan::IssueChoices,
            crate::models::loan::ReturnRequest,
            crate::models::loan::ReturnReceipt,
            crate::models::loan::RenewRequest,
            crate::models::loan::RenewalProposal,
            crate::models::loan::LoanView,
            // Members
            crate::models::member::MemberDetails,
            crate::models::member::MemberForm,
            crate::models::member::MemberRequest,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Session login and logout"),
        (name = "stats", description = "Catalog summary"),
        (name = "books", description = "Books and search"),
        (name = "authors", description = "Authors"),
        (name = "taxonomy", description = "Genres and languages"),
        (name = "instances", description = "Physical copies"),
        (name = "loans", description = "Issue, return and renewal"),
        (name = "members", description = "Member management"),
        (name = "users", description = "User access administration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
