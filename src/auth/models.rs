//! Authentication Models
//! Mission: Define user and token data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: DateTime<Utc>,
}

/// The single role every authenticated caller holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
        }
    }
}

/// Who a token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub user_id: String,
}

impl Identity {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            user_id: user_id.into(),
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub role: Role,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expiration timestamp
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            role: self.role,
            user_id: self.user_id.clone(),
        }
    }
}

/// Register request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// User profile (password excluded at query level)
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
