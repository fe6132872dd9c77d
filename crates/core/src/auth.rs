//! Sign-in and user records exchanged with the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::traits::GatewayError;

/// Account role. Unknown roles sent by newer backends are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[serde(alias = "USER")]
    User,
    #[serde(alias = "SELLER")]
    Seller,
    #[serde(alias = "ADMIN")]
    Admin,
    #[serde(alias = "SUPER_ADMIN")]
    SuperAdmin,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    #[serde(alias = "ACTIVE")]
    Active,
    #[serde(alias = "INACTIVE")]
    Inactive,
    #[serde(alias = "SUSPENDED")]
    Suspended,
    #[serde(alias = "PENDING_VERIFICATION")]
    PendingVerification,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
            UserStatus::PendingVerification => "pending_verification",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            "pending_verification" => Ok(UserStatus::PendingVerification),
            other => Err(format!("unknown user status: {}", other)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::User => f.write_str("user"),
            UserRole::Seller => f.write_str("seller"),
            UserRole::Admin => f.write_str("admin"),
            UserRole::SuperAdmin => f.write_str("super_admin"),
            UserRole::Other(role) => f.write_str(role),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "user" => UserRole::User,
            "seller" => UserRole::Seller,
            "admin" => UserRole::Admin,
            "super_admin" => UserRole::SuperAdmin,
            "" => return Err("empty role".to_string()),
            other => UserRole::Other(other.to_string()),
        })
    }
}

/// A backend user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub last_login_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|r| matches!(r, UserRole::Admin | UserRole::SuperAdmin))
    }
}

/// Credentials for `login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Admin-only changes to another user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<UserRole>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl AdminUpdateUserInput {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Raw `login`/`refreshToken` result. The backend answers a refused login
/// with a null access token.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Tokens issued by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl AuthPayload {
    pub fn into_session(self) -> Result<AuthSession, GatewayError> {
        match self.access_token.filter(|t| !t.is_empty()) {
            Some(access_token) => Ok(AuthSession {
                access_token,
                refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
                user: self.user,
            }),
            None => Err(GatewayError::Rejected {
                message: "Invalid username or password".to_string(),
                code: None,
            }),
        }
    }
}
