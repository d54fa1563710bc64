//! Authentication, member management and access administration

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    config::{AuthConfig, BootstrapConfig},
    error::{AppError, AppResult},
    models::{
        member::{MemberDetails, MemberRequest},
        user::{NewUser, UpdateAccess, User, UserClaims},
    },
    repository::{users::duplicate_username, Repository},
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
    debt_threshold: Decimal,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig, debt_threshold: Decimal) -> Self {
        Self {
            repository,
            config,
            debt_threshold,
        }
    }

    /// Check credentials and issue a session token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users_get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!(username, "Rejected login");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token(&user)?;
        tracing::info!(user_id = user.id, username = %user.username, "User logged in");
        Ok((token, user))
    }

    /// Signed session token for `user`
    pub fn create_token(&self, user: &User) -> AppResult<String> {
        UserClaims::for_user(user, self.config.jwt_expiration_hours)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Token lifetime in seconds
    pub fn token_lifetime(&self) -> i64 {
        self.config.jwt_expiration_hours as i64 * 3600
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users_get_by_id(id).await
    }

    /// Claims rebuilt from the stored user, keeping the token's validity.
    /// Access changes and deleted accounts apply before the token expires.
    pub async fn refresh_claims(&self, claims: &UserClaims) -> AppResult<UserClaims> {
        let user = match self.repository.users_get_by_id(claims.user_id).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                tracing::info!(user_id = claims.user_id, "Session for a deleted user");
                return Err(AppError::Authentication("Session user no longer exists".to_string()));
            }
            Err(e) => return Err(e),
        };

        Ok(UserClaims {
            exp: claims.exp,
            iat: claims.iat,
            ..UserClaims::for_user(&user, 0)
        })
    }

    // Members

    pub async fn list_members(&self) -> AppResult<Vec<MemberDetails>> {
        let members = self.repository.members_list().await?;
        Ok(members
            .into_iter()
            .map(|m| MemberDetails::new(m, self.debt_threshold))
            .collect())
    }

    pub async fn get_member(&self, id: i32) -> AppResult<MemberDetails> {
        let member = self.repository.members_get_by_id(id).await?;
        Ok(MemberDetails::new(member, self.debt_threshold))
    }

    /// Register a user and its member row
    pub async fn create_member(&self, request: &MemberRequest) -> AppResult<MemberDetails> {
        request.user.validate()?;
        request.member.validate()?;

        let password = request.user.password.as_deref().ok_or_else(|| {
            AppError::field("password", "required", "This field is required.")
        })?;

        if self
            .repository
            .users_username_exists(&request.user.username, None)
            .await?
        {
            return Err(duplicate_username());
        }

        let new_user = NewUser {
            username: request.user.username.clone(),
            first_name: request.user.first_name.clone(),
            last_name: request.user.last_name.clone(),
            email: request.user.email.clone().unwrap_or_default(),
            password_hash: hash_password(password)?,
            is_superuser: false,
        };

        let member = self
            .repository
            .users_register(&new_user, request.member.outstanding_debt)
            .await?;
        tracing::info!(member_id = member.id, username = %member.username, "Member registered");

        Ok(MemberDetails::new(member, self.debt_threshold))
    }

    /// Update a member and its user; the password changes only when supplied
    pub async fn update_member(&self, id: i32, request: &MemberRequest) -> AppResult<MemberDetails> {
        request.user.validate()?;
        request.member.validate()?;

        let current = self.repository.members_get_by_id(id).await?;
        if self
            .repository
            .users_username_exists(&request.user.username, Some(current.user_id))
            .await?
        {
            return Err(duplicate_username());
        }

        let password_hash = request
            .user
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let member = self
            .repository
            .members_update(id, &request.user, password_hash, request.member.outstanding_debt)
            .await?;

        Ok(MemberDetails::new(member, self.debt_threshold))
    }

    /// Delete a member and its user
    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.repository.members_delete(id).await?;
        tracing::info!(member_id = id, "Member deleted");
        Ok(())
    }

    // Access

    pub async fn update_access(&self, user_id: i32, access: &UpdateAccess) -> AppResult<User> {
        let user = self.repository.users_update_access(user_id, access).await?;
        tracing::info!(
            user_id,
            is_superuser = user.is_superuser,
            groups = ?user.groups,
            permissions = ?user.permissions,
            "User access updated"
        );
        Ok(user)
    }

    /// Register the configured superuser unless it already exists
    pub async fn bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<()> {
        let (Some(username), Some(password)) = (&bootstrap.admin_username, &bootstrap.admin_password)
        else {
            return Ok(());
        };

        if self.repository.users_username_exists(username, None).await? {
            tracing::debug!(username = %username, "Bootstrap superuser already present");
            return Ok(());
        }

        let admin = NewUser {
            username: username.clone(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: hash_password(password)?,
            is_superuser: true,
        };
        self.repository.users_register(&admin, Decimal::ZERO).await?;
        tracing::info!(username = %username, "Bootstrap superuser created");
        Ok(())
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "s3cret").unwrap());
        assert!(!verify_password(&hash, "wrong").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "x"),
            Err(AppError::Internal(_))
        ));
    }
}
