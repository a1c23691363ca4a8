// src/models/user.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Account role. Stored as lowercase text in the `users.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    /// Landing endpoint a client should open after login.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Admin => "/api/admin/dashboard",
            Role::Student => "/api/student/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Argon2 password hash. Never serialized.
    #[serde(skip)]
    pub password: String,

    pub role: Role,

    /// Inactive accounts cannot log in.
    pub is_active: bool,
}

/// Self-service registration. Always creates a student.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required (max 100 characters)."))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required (max 128 characters)."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Admin creating an account with an explicit role.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Username is required (max 100 characters)."))]
    pub username: String,
    #[validate(length(min = 1, max = 128, message = "Password is required (max 128 characters)."))]
    pub password: String,
    pub role: Role,
}

/// Partial update of an account by an admin. Blank strings are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Student editing their own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Username cannot be empty."))]
    pub username: String,
    /// Password is only changed when present and non-blank.
    pub password: Option<String>,
}

/// Response for `GET /api/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub dashboard: &'static str,
}
