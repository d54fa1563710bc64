//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod instances;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod stats;
pub mod taxonomy;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts},
    http::request::Parts,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    models::user::UserClaims,
    policy::{self, Operation, Requirement},
    services::users::UsersService,
    AppState,
};

/// Request body, parsed lazily so that handlers check the policy before
/// reporting a malformed body (`let Json(form) = body?;`)
pub type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Caller identity, from the session cookie or a bearer token.
///
/// Anonymous callers (no token, or a token that fails to verify) carry no
/// claims; whether that is acceptable is decided by the policy table, not
/// by the extractor. Guarded operations re-read the caller's access from
/// the database, so the token only proves identity.
pub struct Session {
    claims: Option<UserClaims>,
    users: UsersService,
}

impl Session {
    /// Check the caller against the policy for `operation`
    pub async fn authorize(&self, operation: Operation) -> AppResult<()> {
        if policy::requirement(operation) == Requirement::Anyone {
            return Ok(());
        }
        self.user(operation).await.map(|_| ())
    }

    /// Like [`Session::authorize`], returning the caller's current claims
    pub async fn user(&self, operation: Operation) -> AppResult<UserClaims> {
        // Token claims first: requests they deny never reach the database
        policy::authorize(operation, self.claims.as_ref())?;
        let claims = self
            .claims
            .as_ref()
            .ok_or_else(|| AppError::Authentication("Login required".to_string()))?;

        let current = self.users.refresh_claims(claims).await?;
        policy::authorize(operation, Some(&current))?;
        Ok(current)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let users = state.services.users.clone();

        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(auth)| auth.token().to_string());

        let token = bearer.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(&state.config.auth.cookie_name)
                .map(|cookie| cookie.value().to_string())
        });

        let Some(token) = token else {
            return Ok(Session { claims: None, users });
        };

        let claims = match UserClaims::from_token(&token, &state.config.auth.jwt_secret) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {}", e);
                None
            }
        };
        Ok(Session { claims, users })
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Session
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Index
        .route("/stats", get(stats::get_summary))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/search", get(books::search_books))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Genres and languages
        .route("/genres", get(taxonomy::list_genres).post(taxonomy::create_genre))
        .route(
            "/genres/:id",
            get(taxonomy::get_genre)
                .put(taxonomy::update_genre)
                .delete(taxonomy::delete_genre),
        )
        .route(
            "/languages",
            get(taxonomy::list_languages).post(taxonomy::create_language),
        )
        .route(
            "/languages/:id",
            get(taxonomy::get_language)
                .put(taxonomy::update_language)
                .delete(taxonomy::delete_language),
        )
        // Book instances
        .route(
            "/instances",
            get(instances::list_instances).post(instances::create_instance),
        )
        .route(
            "/instances/:id",
            get(instances::get_instance)
                .put(instances::update_instance)
                .delete(instances::delete_instance),
        )
        .route(
            "/instances/:id/renew",
            get(loans::renewal_proposal).post(loans::renew_instance),
        )
        // Loans
        .route("/loans", get(loans::list_all_loans))
        .route("/loans/mine", get(loans::list_my_loans))
        .route("/loans/issue", get(loans::issue_choices).post(loans::issue_book))
        .route("/loans/return", get(loans::return_candidates).post(loans::return_book))
        // Members
        .route("/members", get(members::list_members).post(members::create_member))
        .route(
            "/members/:id",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        // User access
        .route("/users/:id/access", put(users::update_access))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
