//! Business logic services

pub mod catalog;
pub mod loans;
pub mod users;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.circulation.clone()),
            users: users::UsersService::new(
                repository.clone(),
                config.auth.clone(),
                config.circulation.debt_threshold(),
            ),
            repository,
        }
    }

    /// Database round trip for the readiness probe
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.ping().await
    }
}
