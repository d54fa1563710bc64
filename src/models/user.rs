//! User model, permissions and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Named permissions a user may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Issue, return and renew copies; see every loan
    CanMarkReturned,
    CanManageMembers,
    /// Create, rename and delete genres and languages
    CanManageTaxonomy,
    AddAuthor,
    ChangeAuthor,
    DeleteAuthor,
    AddBook,
    ChangeBook,
    DeleteBook,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::CanMarkReturned,
        Permission::CanManageMembers,
        Permission::CanManageTaxonomy,
        Permission::AddAuthor,
        Permission::ChangeAuthor,
        Permission::DeleteAuthor,
        Permission::AddBook,
        Permission::ChangeBook,
        Permission::DeleteBook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::CanManageMembers => "can_manage_members",
            Permission::CanManageTaxonomy => "can_manage_taxonomy",
            Permission::AddAuthor => "add_author",
            Permission::ChangeAuthor => "change_author",
            Permission::DeleteAuthor => "delete_author",
            Permission::AddBook => "add_book",
            Permission::ChangeBook => "change_book",
            Permission::DeleteBook => "delete_book",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Invalid permission: {}", s))
    }
}

/// User groups (roles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Group {
    Librarian,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Librarian => "Librarian",
        }
    }
}

impl std::str::FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Librarian" => Ok(Group::Librarian),
            _ => Err(format!("Invalid group: {}", s)),
        }
    }
}

/// Internal row structure for database queries (array columns as strings)
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_superuser: bool,
    groups: Vec<String>,
    permissions: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password: row.password,
            is_superuser: row.is_superuser,
            // Unknown names left behind by older deployments are dropped
            groups: row.groups.iter().filter_map(|g| g.parse().ok()).collect(),
            permissions: row.permissions.iter().filter_map(|p| p.parse().ok()).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full user model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password: String,
    pub is_superuser: bool,
    pub groups: Vec<Group>,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation for lists and choice fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// User identity sub-form used by member create/update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserForm {
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters"))]
    pub username: String,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    #[serde(default)]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    /// Required on create; on update the password is kept when omitted
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
}

/// Values written for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub is_superuser: bool,
}

/// Replace a user's groups, permissions and superuser flag
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAccess {
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// JWT claims carried by the session cookie or bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    pub groups: Vec<Group>,
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn for_user(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            groups: user.groups.clone(),
            permissions: user.permissions.clone(),
            exp: now + (expiration_hours as i64 * 3600),
            iat: now,
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_superuser || self.permissions.contains(&permission)
    }

    pub fn in_group(&self, group: Group) -> bool {
        self.is_superuser || self.groups.contains(&group)
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 3,
            username: "librarian".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            is_superuser: false,
            groups: vec![Group::Librarian],
            permissions: vec![Permission::CanMarkReturned],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_permission_names_round_trip() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
        assert!("can_fly".parse::<Permission>().is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let claims = UserClaims::for_user(&user(), 1);
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 3);
        assert_eq!(parsed.groups, vec![Group::Librarian]);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_superuser_has_everything() {
        let mut admin = user();
        admin.is_superuser = true;
        admin.groups.clear();
        admin.permissions.clear();
        let claims = UserClaims::for_user(&admin, 1);
        assert!(claims.has_permission(Permission::DeleteBook));
        assert!(claims.in_group(Group::Librarian));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let mut u = user();
        u.password = "hash".into();
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["permissions"][0], "can_mark_returned");
    }
}
